use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use surveyrpc_core::{AppError, AppResult};

use crate::{DataRow, integer_cast};

/// Column holding the response primary key.
const ID_COLUMN: &str = "id";
/// Column holding the participant token.
const TOKEN_COLUMN: &str = "token";

/// Primary key of a response row within its survey partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseId(i64);

impl ResponseId {
    /// Creates a response identifier from its numeric value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the numeric value.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Parses an integer or an integer-like string transport value.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => number.as_i64().map(Self),
            Value::String(text) => text.trim().parse::<i64>().ok().map(Self),
            _ => None,
        }
    }

    /// Converts a caller-supplied value with [`integer_cast`] semantics.
    ///
    /// Unusable values become `0`, which matches no row.
    #[must_use]
    pub fn from_transport(value: &Value) -> Self {
        Self(integer_cast(value))
    }

    /// Normalises a single identifier or a list of identifiers.
    ///
    /// Every entry is kept, so an unusable entry is still attempted and
    /// reported as a miss instead of discarding the batch.
    #[must_use]
    pub fn list_from_value(value: &Value) -> Vec<Self> {
        match value {
            Value::Array(items) => items.iter().map(Self::from_transport).collect(),
            single => vec![Self::from_transport(single)],
        }
    }
}

impl std::fmt::Display for ResponseId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// How the row targeted by an update is located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseIdentifier {
    /// Lookup by primary key. Preferred when both keys are supplied.
    Id(ResponseId),
    /// Lookup by participant token.
    Token(String),
}

impl ResponseIdentifier {
    /// Extracts the identifier from an update payload.
    ///
    /// `null` values count as absent. A present `id` always wins and is cast
    /// like any other transport integer, so `"abc"` looks up row `0`.
    #[must_use]
    pub fn from_fields(fields: &DataRow) -> Option<Self> {
        if let Some(id) = fields.get(ID_COLUMN).filter(|value| !value.is_null()) {
            return Some(Self::Id(ResponseId::from_transport(id)));
        }

        fields
            .get(TOKEN_COLUMN)
            .and_then(|value| match value {
                Value::String(token) => Some(token.clone()),
                Value::Number(number) => Some(number.to_string()),
                _ => None,
            })
            .map(Self::Token)
    }
}

/// Declared column set of a survey's response partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseColumns {
    ordered: Vec<String>,
    lookup: BTreeSet<String>,
}

impl ResponseColumns {
    /// Creates a column set preserving the storage order.
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        let lookup = columns.iter().cloned().collect();
        Self {
            ordered: columns,
            lookup,
        }
    }

    /// Returns columns in storage order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.ordered
    }

    /// Returns whether the column is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains(name)
    }

    /// Returns every supplied field name that is not a declared column.
    #[must_use]
    pub fn unknown_fields(&self, fields: &DataRow) -> Vec<String> {
        fields
            .keys()
            .filter(|name| !self.contains(name))
            .cloned()
            .collect()
    }
}

/// Field names rejected by column validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidColumns(Vec<String>);

impl InvalidColumns {
    /// Returns the rejected names.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.0
    }
}

/// Field assignments validated against the declared column set.
///
/// The identifying columns are never written: `token` is only a lookup key
/// and `id` already matches the resolved row.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseUpdate {
    assignments: DataRow,
}

impl ResponseUpdate {
    /// Validates every supplied field name before anything is assigned.
    pub fn validate(columns: &ResponseColumns, fields: DataRow) -> Result<Self, InvalidColumns> {
        let unknown = columns.unknown_fields(&fields);
        if !unknown.is_empty() {
            return Err(InvalidColumns(unknown));
        }

        let assignments = fields
            .into_iter()
            .filter(|(name, _)| name != TOKEN_COLUMN && name != ID_COLUMN)
            .collect();

        Ok(Self { assignments })
    }

    /// Returns the assignments that will be applied.
    #[must_use]
    pub fn assignments(&self) -> &DataRow {
        &self.assignments
    }
}

/// One row of a survey's response partition.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRecord {
    id: ResponseId,
    fields: DataRow,
}

impl ResponseRecord {
    /// Builds a record from a stored row, which must carry an integer `id`.
    pub fn from_row(fields: DataRow) -> AppResult<Self> {
        let id = fields
            .get(ID_COLUMN)
            .and_then(ResponseId::from_value)
            .ok_or_else(|| {
                AppError::Internal("response row is missing an integer id".to_owned())
            })?;

        Ok(Self { id, fields })
    }

    /// Returns the row primary key.
    #[must_use]
    pub fn id(&self) -> ResponseId {
        self.id
    }

    /// Returns the participant token, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.fields.get(TOKEN_COLUMN).and_then(Value::as_str)
    }

    /// Returns whether the response has been submitted.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.fields
            .get("submitdate")
            .is_some_and(|value| !value.is_null())
    }

    /// Returns all stored fields.
    #[must_use]
    pub fn fields(&self) -> &DataRow {
        &self.fields
    }

    /// Applies validated assignments to the row.
    pub fn apply(&mut self, update: &ResponseUpdate) {
        for (name, value) in update.assignments() {
            self.fields.insert(name.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::{Map, Value, json};

    use super::{
        ResponseColumns, ResponseId, ResponseIdentifier, ResponseRecord, ResponseUpdate,
    };

    fn columns() -> ResponseColumns {
        ResponseColumns::new(vec![
            "id".to_owned(),
            "token".to_owned(),
            "submitdate".to_owned(),
            "42X1X1".to_owned(),
        ])
    }

    fn row(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn identifier_prefers_id_over_token() {
        let fields = row(json!({"id": "7", "token": "abc"}));
        assert_eq!(
            ResponseIdentifier::from_fields(&fields),
            Some(ResponseIdentifier::Id(ResponseId::new(7)))
        );
    }

    #[test]
    fn identifier_falls_back_to_token() {
        let fields = row(json!({"id": null, "token": "abc"}));
        assert_eq!(
            ResponseIdentifier::from_fields(&fields),
            Some(ResponseIdentifier::Token("abc".to_owned()))
        );
    }

    #[test]
    fn identifier_missing_when_neither_key_is_usable() {
        let fields = row(json!({"42X1X1": "A1"}));
        assert_eq!(ResponseIdentifier::from_fields(&fields), None);
    }

    #[test]
    fn update_rejects_unknown_columns_and_names_them() {
        let result = ResponseUpdate::validate(&columns(), row(json!({"id": 7, "score": 3})));
        let rejected = result.err().map(|error| error.names().to_vec());
        assert_eq!(rejected, Some(vec!["score".to_owned()]));
    }

    #[test]
    fn update_drops_identifying_columns() {
        let result = ResponseUpdate::validate(
            &columns(),
            row(json!({"id": 7, "token": "abc", "42X1X1": "A2"})),
        );
        assert!(result.is_ok());
        let update = result.unwrap_or_else(|_| unreachable!());
        assert_eq!(update.assignments().len(), 1);
        assert_eq!(update.assignments().get("42X1X1"), Some(&json!("A2")));
    }

    #[test]
    fn apply_overwrites_only_assigned_fields() {
        let record = ResponseRecord::from_row(row(json!({
            "id": 7,
            "token": "abc",
            "submitdate": "2024-01-01 10:00:00",
            "42X1X1": "A1",
        })));
        assert!(record.is_ok());
        let mut record = record.unwrap_or_else(|_| unreachable!());
        let update = ResponseUpdate::validate(&columns(), row(json!({"42X1X1": "A3"})))
            .unwrap_or_else(|_| unreachable!());

        record.apply(&update);

        assert_eq!(record.fields().get("42X1X1"), Some(&json!("A3")));
        assert_eq!(record.token(), Some("abc"));
        assert!(record.is_completed());
    }

    #[test]
    fn non_numeric_id_is_cast_instead_of_ignored() {
        let fields = row(json!({"id": "abc"}));
        assert_eq!(
            ResponseIdentifier::from_fields(&fields),
            Some(ResponseIdentifier::Id(ResponseId::new(0)))
        );
    }

    #[test]
    fn id_lists_keep_every_entry() {
        assert_eq!(
            ResponseId::list_from_value(&json!("12")),
            vec![ResponseId::new(12)]
        );
        assert_eq!(
            ResponseId::list_from_value(&json!([3, "4"])),
            vec![ResponseId::new(3), ResponseId::new(4)]
        );
        assert_eq!(
            ResponseId::list_from_value(&json!([3, "x"])),
            vec![ResponseId::new(3), ResponseId::new(0)]
        );
        assert!(ResponseId::list_from_value(&json!([])).is_empty());
    }

    #[test]
    fn rejected_names_keep_caller_order() {
        let result = ResponseUpdate::validate(
            &columns(),
            row(json!({"id": 2, "zeta": 1, "alpha": 2})),
        );
        let rejected = result.err().map(|error| error.names().to_vec());
        assert_eq!(rejected, Some(vec!["zeta".to_owned(), "alpha".to_owned()]));
    }

    #[test]
    fn row_without_id_is_rejected() {
        assert!(ResponseRecord::from_row(row(json!({"token": "abc"}))).is_err());
    }

    proptest! {
        #[test]
        fn undeclared_names_are_never_accepted(name in "[a-z]{1,12}") {
            prop_assume!(!["id", "token", "submitdate"].contains(&name.as_str()));
            let mut fields = Map::new();
            fields.insert(name.clone(), json!("value"));

            let result = ResponseUpdate::validate(&columns(), fields);
            let rejected = result.err().map(|error| error.names().to_vec());
            prop_assert_eq!(rejected, Some(vec![name]));
        }
    }
}
