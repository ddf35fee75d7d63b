//! PostgreSQL-backed survey settings and structure.

use async_trait::async_trait;
use sqlx::PgPool;

use surveyrpc_application::SurveyRepository;
use surveyrpc_core::{AppError, AppResult, SurveyId, UserId};
use surveyrpc_domain::{DataTable, Survey};

use crate::postgres_dynamic_tables::read_table;

/// Structure tables in document order with their sort keys.
const STRUCTURE_TABLES: [(&str, &[&str]); 3] = [
    ("surveys", &["sid"]),
    ("groups", &["group_order", "gid"]),
    ("questions", &["gid", "question_order", "qid"]),
];

/// PostgreSQL implementation of the survey repository port.
#[derive(Clone)]
pub struct PostgresSurveyRepository {
    pool: PgPool,
}

impl PostgresSurveyRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SurveyRow {
    sid: i64,
    owner_id: i64,
    active: bool,
    allow_edit_after_completion: bool,
    save_timings: bool,
}

impl From<SurveyRow> for Survey {
    fn from(row: SurveyRow) -> Self {
        Survey::new(
            SurveyId::new(row.sid),
            UserId::new(row.owner_id),
            row.active,
            row.allow_edit_after_completion,
            row.save_timings,
        )
    }
}

#[async_trait]
impl SurveyRepository for PostgresSurveyRepository {
    async fn find_survey(&self, survey_id: SurveyId) -> AppResult<Option<Survey>> {
        let row = sqlx::query_as::<_, SurveyRow>(
            r#"
            SELECT sid, owner_id, active, allow_edit_after_completion, save_timings
            FROM surveys
            WHERE sid = $1
            "#,
        )
        .bind(survey_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find survey '{survey_id}': {error}"))
        })?;

        Ok(row.map(Survey::from))
    }

    async fn set_allow_edit_after_completion(
        &self,
        survey_id: SurveyId,
        allowed: bool,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE surveys
            SET allow_edit_after_completion = $2
            WHERE sid = $1
            "#,
        )
        .bind(survey_id.value())
        .bind(allowed)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to update edit setting of survey '{survey_id}': {error}"
            ))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "survey '{survey_id}' does not exist"
            )));
        }

        Ok(())
    }

    async fn load_structure(&self, survey_id: SurveyId) -> AppResult<Vec<DataTable>> {
        let mut tables = Vec::with_capacity(STRUCTURE_TABLES.len());
        for (table, order_by) in STRUCTURE_TABLES {
            if let Some(data) =
                read_table(&self.pool, table, table, Some(("sid", survey_id)), order_by).await?
            {
                tables.push(data);
            }
        }

        Ok(tables)
    }
}
