//! Helpers for tables whose name and shape are only known at runtime.

use serde_json::Value;
use sqlx::PgPool;

use surveyrpc_core::{AppError, AppResult, SurveyId};
use surveyrpc_domain::{DataRow, DataTable, SurveyPartition};

/// Resolves the physical table names of survey partitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionNames {
    prefix: String,
}

impl PartitionNames {
    /// Creates a resolver for the given table prefix.
    ///
    /// The prefix may only contain ASCII letters, digits and underscores.
    pub fn new(prefix: impl Into<String>) -> AppResult<Self> {
        let prefix = prefix.into();
        if !prefix
            .chars()
            .all(|character| character.is_ascii_alphanumeric() || character == '_')
        {
            return Err(AppError::Validation(format!(
                "table prefix '{prefix}' may only contain letters, digits and underscores"
            )));
        }

        Ok(Self { prefix })
    }

    /// Returns the unquoted table name of a partition.
    #[must_use]
    pub fn table(&self, survey_id: SurveyId, partition: SurveyPartition) -> String {
        let prefix = &self.prefix;
        match partition {
            SurveyPartition::Responses => format!("{prefix}survey_{survey_id}"),
            SurveyPartition::Tokens => format!("{prefix}tokens_{survey_id}"),
            SurveyPartition::Timings => format!("{prefix}survey_{survey_id}_timings"),
        }
    }
}

/// Quotes an SQL identifier.
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Lists a table's columns in declaration order. Empty when the table does not exist.
pub(crate) async fn table_columns(pool: &PgPool, table: &str) -> AppResult<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT column_name::TEXT
        FROM information_schema.columns
        WHERE table_schema = current_schema()
          AND table_name = $1
        ORDER BY ordinal_position
        "#,
    )
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(|error| {
        AppError::Internal(format!("failed to list columns of table '{table}': {error}"))
    })
}

/// Converts `row_to_json` output into rows.
pub(crate) fn json_rows(values: Vec<Value>) -> AppResult<Vec<DataRow>> {
    values
        .into_iter()
        .map(|value| match value {
            Value::Object(row) => Ok(row),
            other => Err(AppError::Internal(format!(
                "expected a JSON object row, got '{other}'"
            ))),
        })
        .collect()
}

/// Reads every row of `table` matching an optional `survey_column = survey_id` filter.
pub(crate) async fn read_table(
    pool: &PgPool,
    table: &str,
    element_name: &str,
    survey_filter: Option<(&str, SurveyId)>,
    order_by: &[&str],
) -> AppResult<Option<DataTable>> {
    let columns = table_columns(pool, table).await?;
    if columns.is_empty() {
        return Ok(None);
    }

    let mut sql = format!(
        "SELECT row_to_json(t)::jsonb FROM {} AS t",
        quote_identifier(table)
    );
    if let Some((column, _)) = survey_filter {
        sql.push_str(&format!(" WHERE t.{} = $1", quote_identifier(column)));
    }
    let order_columns: Vec<String> = if order_by.is_empty() {
        columns.iter().take(1).map(|column| quote_identifier(column)).collect()
    } else {
        order_by.iter().map(|column| quote_identifier(column)).collect()
    };
    sql.push_str(&format!(" ORDER BY {}", order_columns.join(", ")));

    let mut query = sqlx::query_scalar::<_, Value>(&sql);
    if let Some((_, survey_id)) = survey_filter {
        query = query.bind(survey_id.value());
    }
    let values = query
        .fetch_all(pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read table '{table}': {error}")))?;

    Ok(Some(DataTable::new(
        element_name,
        columns,
        json_rows(values)?,
    )))
}

/// Maps data-class and constraint errors to validation failures.
pub(crate) fn validation_or_internal(error: sqlx::Error, operation: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error
            .code()
            .is_some_and(|code| code.starts_with("22") || code.starts_with("23"))
    {
        return AppError::Validation(format!("{operation} rejected: {database_error}"));
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}

#[cfg(test)]
mod tests {
    use surveyrpc_core::SurveyId;
    use surveyrpc_domain::SurveyPartition;

    use super::{PartitionNames, quote_identifier};

    #[test]
    fn partition_names_follow_host_convention() {
        let names = PartitionNames::new("lime_").unwrap_or_default();
        let survey_id = SurveyId::new(123456);

        assert_eq!(
            names.table(survey_id, SurveyPartition::Responses),
            "lime_survey_123456"
        );
        assert_eq!(
            names.table(survey_id, SurveyPartition::Tokens),
            "lime_tokens_123456"
        );
        assert_eq!(
            names.table(survey_id, SurveyPartition::Timings),
            "lime_survey_123456_timings"
        );
    }

    #[test]
    fn prefix_rejects_sql_metacharacters() {
        assert!(PartitionNames::new("lime\"; DROP").is_err());
        assert!(PartitionNames::new("").is_ok());
    }

    #[test]
    fn identifiers_escape_embedded_quotes() {
        assert_eq!(quote_identifier("42X1X1"), "\"42X1X1\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }
}
