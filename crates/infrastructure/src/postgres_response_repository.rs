//! PostgreSQL-backed access to survey partitions.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use surveyrpc_application::ResponseRepository;
use surveyrpc_core::{AppError, AppResult, SurveyId};
use surveyrpc_domain::{
    DataTable, ResponseColumns, ResponseId, ResponseIdentifier, ResponseRecord, SurveyPartition,
};

use crate::postgres_dynamic_tables::{
    PartitionNames, json_rows, quote_identifier, read_table, table_columns,
    validation_or_internal,
};

/// PostgreSQL implementation of the survey partition port.
#[derive(Clone)]
pub struct PostgresResponseRepository {
    pool: PgPool,
    names: PartitionNames,
}

impl PostgresResponseRepository {
    /// Creates a repository with the provided connection pool and partition naming.
    #[must_use]
    pub fn new(pool: PgPool, names: PartitionNames) -> Self {
        Self { pool, names }
    }

    fn responses_table(&self, survey_id: SurveyId) -> String {
        self.names.table(survey_id, SurveyPartition::Responses)
    }

    async fn edits_after_completion_allowed(&self, survey_id: SurveyId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT allow_edit_after_completion FROM surveys WHERE sid = $1",
        )
        .bind(survey_id.value())
        .fetch_optional(&self.pool)
        .await
        .map(|allowed| allowed.unwrap_or(false))
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to read edit setting for survey '{survey_id}': {error}"
            ))
        })
    }

    async fn delete_by_id(
        &self,
        table: &str,
        response_id: ResponseId,
        operation: &str,
    ) -> AppResult<bool> {
        if table_columns(&self.pool, table).await?.is_empty() {
            return Ok(false);
        }

        let sql = format!("DELETE FROM {} WHERE id = $1", quote_identifier(table));
        let result = sqlx::query(&sql)
            .bind(response_id.value())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to {operation} '{response_id}': {error}"))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ResponseRepository for PostgresResponseRepository {
    async fn response_columns(&self, survey_id: SurveyId) -> AppResult<Option<ResponseColumns>> {
        let columns = table_columns(&self.pool, &self.responses_table(survey_id)).await?;
        Ok((!columns.is_empty()).then(|| ResponseColumns::new(columns)))
    }

    async fn find_responses(
        &self,
        survey_id: SurveyId,
        identifier: &ResponseIdentifier,
    ) -> AppResult<Vec<ResponseRecord>> {
        let table = self.responses_table(survey_id);
        let select = format!(
            "SELECT row_to_json(t)::jsonb FROM {} AS t",
            quote_identifier(&table)
        );

        let values = match identifier {
            ResponseIdentifier::Id(response_id) => {
                sqlx::query_scalar::<_, Value>(&format!("{select} WHERE t.id = $1"))
                    .bind(response_id.value())
                    .fetch_all(&self.pool)
                    .await
            }
            ResponseIdentifier::Token(token) => {
                let columns = table_columns(&self.pool, &table).await?;
                if !columns.iter().any(|column| column == "token") {
                    return Ok(Vec::new());
                }
                sqlx::query_scalar::<_, Value>(&format!("{select} WHERE t.token = $1"))
                    .bind(token.as_str())
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to find responses in survey '{survey_id}': {error}"
            ))
        })?;

        json_rows(values)?
            .into_iter()
            .map(ResponseRecord::from_row)
            .collect()
    }

    async fn save_response(&self, survey_id: SurveyId, record: &ResponseRecord) -> AppResult<()> {
        let table = self.responses_table(survey_id);
        let columns = table_columns(&self.pool, &table).await?;

        // Completion is read from the stored row, so tables without a
        // `submitdate` column never count as completed.
        let stored_completed = self
            .find_responses(survey_id, &ResponseIdentifier::Id(record.id()))
            .await?
            .first()
            .is_some_and(ResponseRecord::is_completed);
        if stored_completed && !self.edits_after_completion_allowed(survey_id).await? {
            return Err(AppError::Validation(format!(
                "response '{}' is completed and survey '{survey_id}' forbids editing it",
                record.id()
            )));
        }

        let assignments: Vec<String> = record
            .fields()
            .keys()
            .filter(|name| name.as_str() != "id" && columns.contains(*name))
            .map(|name| {
                let column = quote_identifier(name);
                format!("{column} = r.{column}")
            })
            .collect();
        if assignments.is_empty() {
            return Ok(());
        }

        let quoted_table = quote_identifier(&table);
        let sql = format!(
            "UPDATE {quoted_table} AS t SET {} \
             FROM jsonb_populate_record(NULL::{quoted_table}, $1) AS r \
             WHERE t.id = $2",
            assignments.join(", ")
        );

        let result = sqlx::query(&sql)
            .bind(Value::Object(record.fields().clone()))
            .bind(record.id().value())
            .execute(&self.pool)
            .await
            .map_err(|error| validation_or_internal(error, "save response"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "response '{}' no longer exists",
                record.id()
            )));
        }

        Ok(())
    }

    async fn delete_response(
        &self,
        survey_id: SurveyId,
        response_id: ResponseId,
    ) -> AppResult<bool> {
        self.delete_by_id(&self.responses_table(survey_id), response_id, "delete response")
            .await
    }

    async fn delete_timing(&self, survey_id: SurveyId, response_id: ResponseId) -> AppResult<bool> {
        self.delete_by_id(
            &self.names.table(survey_id, SurveyPartition::Timings),
            response_id,
            "delete timing row of response",
        )
        .await
    }

    async fn read_partition(
        &self,
        survey_id: SurveyId,
        partition: SurveyPartition,
    ) -> AppResult<Option<DataTable>> {
        let (element_name, order_by): (&str, &[&str]) = match partition {
            SurveyPartition::Responses => ("responses", &["id"]),
            SurveyPartition::Tokens => ("tokens", &[]),
            SurveyPartition::Timings => ("timings", &["id"]),
        };

        read_table(
            &self.pool,
            &self.names.table(survey_id, partition),
            element_name,
            None,
            order_by,
        )
        .await
    }
}
