use serde_json::Value;
use surveyrpc_core::{SessionKey, SurveyId};
use surveyrpc_domain::{DataRow, integer_cast};

use super::CallError;

/// Positional call parameters.
pub(super) struct Params<'a> {
    values: &'a [Value],
}

impl<'a> Params<'a> {
    pub(super) fn new(values: &'a [Value]) -> Self {
        Self { values }
    }

    fn get(&self, index: usize) -> Option<&'a Value> {
        self.values.get(index).filter(|value| !value.is_null())
    }

    /// The session key is always the first parameter.
    ///
    /// A missing or non-string key becomes a blank key, which fails session
    /// validation like any other unknown key.
    pub(super) fn session_key(&self) -> SessionKey {
        match self.get(0) {
            Some(Value::String(key)) => SessionKey::new(key.as_str()),
            Some(Value::Number(number)) => SessionKey::new(number.to_string()),
            _ => SessionKey::new(""),
        }
    }

    pub(super) fn string(&self, index: usize, name: &str) -> Result<String, CallError> {
        match self.get(index) {
            Some(Value::String(text)) => Ok(text.clone()),
            Some(Value::Number(number)) => Ok(number.to_string()),
            Some(_) => Err(CallError::InvalidParams(format!(
                "parameter {} ({name}) must be a string",
                index + 1
            ))),
            None => Err(CallError::InvalidParams(format!(
                "parameter {} ({name}) is required",
                index + 1
            ))),
        }
    }

    /// CRUD verb, defaulting to `read` when omitted.
    pub(super) fn crud_verb(&self, index: usize) -> String {
        match self.get(index) {
            Some(Value::String(verb)) => verb.clone(),
            Some(other) => other.to_string(),
            None => "read".to_owned(),
        }
    }

    /// Survey id with integer-cast semantics: unusable values become `0`,
    /// which never names a survey.
    pub(super) fn survey_id(&self, index: usize) -> SurveyId {
        SurveyId::new(self.get(index).map_or(0, integer_cast))
    }

    /// Response fields; anything but an object counts as no fields.
    pub(super) fn object(&self, index: usize) -> DataRow {
        match self.get(index) {
            Some(Value::Object(fields)) => fields.clone(),
            _ => DataRow::new(),
        }
    }

    pub(super) fn value(&self, index: usize) -> Value {
        self.get(index).cloned().unwrap_or(Value::Null)
    }
}
