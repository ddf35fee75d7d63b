//! Fake ports shared by the service tests.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Value, json};
use surveyrpc_core::{AppError, AppResult, SurveyId, UserId};
use surveyrpc_domain::{
    DataRow, DataTable, PermissionGrant, PermissionScope, ResponseColumns, ResponseId,
    ResponseIdentifier, ResponseRecord, Survey, SurveyPartition,
};
use tokio::sync::Mutex;

use crate::{
    AuditEvent, AuditRepository, PermissionRepository, ResponseDeleteEvent,
    ResponseLifecycleObserver, ResponseRepository, SurveyRepository,
};

pub(crate) const OWNER: UserId = UserId::new(1);
pub(crate) const EDITOR: UserId = UserId::new(2);
pub(crate) const SURVEY: SurveyId = SurveyId::new(42);

pub(crate) fn row(value: Value) -> DataRow {
    value.as_object().cloned().unwrap_or_default()
}

#[derive(Default)]
struct FakeState {
    surveys: HashMap<SurveyId, Survey>,
    flag_writes: Vec<(SurveyId, bool)>,
    response_columns: HashMap<SurveyId, Vec<String>>,
    responses: HashMap<SurveyId, Vec<DataRow>>,
    tokens: HashMap<SurveyId, Vec<DataRow>>,
    timings: HashMap<SurveyId, Vec<DataRow>>,
    grants: HashMap<(UserId, PermissionScope), Vec<PermissionGrant>>,
    audit_events: Vec<AuditEvent>,
    fail_flag_restore: bool,
    fail_response_lookup: bool,
}

/// In-process stand-in for every storage port.
///
/// Saving a completed response is rejected unless the survey currently
/// allows edits after completion, like the host's model validation.
#[derive(Default)]
pub(crate) struct FakeSurveyStore {
    state: Mutex<FakeState>,
}

impl FakeSurveyStore {
    pub(crate) async fn insert_survey(&self, survey: Survey) {
        self.state.lock().await.surveys.insert(survey.id(), survey);
    }

    pub(crate) async fn insert_responses(
        &self,
        survey_id: SurveyId,
        columns: &[&str],
        rows: Vec<DataRow>,
    ) {
        let mut state = self.state.lock().await;
        state.response_columns.insert(
            survey_id,
            columns.iter().map(|column| (*column).to_owned()).collect(),
        );
        state.responses.insert(survey_id, rows);
    }

    pub(crate) async fn insert_tokens(&self, survey_id: SurveyId, rows: Vec<DataRow>) {
        self.state.lock().await.tokens.insert(survey_id, rows);
    }

    pub(crate) async fn insert_timings(&self, survey_id: SurveyId, rows: Vec<DataRow>) {
        self.state.lock().await.timings.insert(survey_id, rows);
    }

    pub(crate) async fn grant(&self, user_id: UserId, grant: PermissionGrant) {
        self.state
            .lock()
            .await
            .grants
            .entry((user_id, grant.scope))
            .or_default()
            .push(grant);
    }

    pub(crate) async fn fail_flag_restore(&self) {
        self.state.lock().await.fail_flag_restore = true;
    }

    pub(crate) async fn fail_response_lookup(&self) {
        self.state.lock().await.fail_response_lookup = true;
    }

    pub(crate) async fn allow_edit_flag(&self, survey_id: SurveyId) -> Option<bool> {
        self.state
            .lock()
            .await
            .surveys
            .get(&survey_id)
            .map(Survey::allows_edit_after_completion)
    }

    pub(crate) async fn flag_writes(&self) -> Vec<(SurveyId, bool)> {
        self.state.lock().await.flag_writes.clone()
    }

    pub(crate) async fn response_rows(&self, survey_id: SurveyId) -> Vec<DataRow> {
        self.state
            .lock()
            .await
            .responses
            .get(&survey_id)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) async fn timing_rows(&self, survey_id: SurveyId) -> Vec<DataRow> {
        self.state
            .lock()
            .await
            .timings
            .get(&survey_id)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) async fn audit_events(&self) -> Vec<AuditEvent> {
        self.state.lock().await.audit_events.clone()
    }
}

fn row_id(row: &DataRow) -> Option<ResponseId> {
    row.get("id").and_then(ResponseId::from_value)
}

fn remove_row(rows: Option<&mut Vec<DataRow>>, response_id: ResponseId) -> bool {
    let Some(rows) = rows else {
        return false;
    };
    let before = rows.len();
    rows.retain(|row| row_id(row) != Some(response_id));
    rows.len() != before
}

fn table(name: &str, rows: &[DataRow]) -> DataTable {
    let columns = rows
        .first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default();
    DataTable::new(name.to_owned(), columns, rows.to_vec())
}

#[async_trait]
impl SurveyRepository for FakeSurveyStore {
    async fn find_survey(&self, survey_id: SurveyId) -> AppResult<Option<Survey>> {
        Ok(self.state.lock().await.surveys.get(&survey_id).cloned())
    }

    async fn set_allow_edit_after_completion(
        &self,
        survey_id: SurveyId,
        allowed: bool,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.fail_flag_restore && !allowed {
            return Err(AppError::Internal("flag write failed".to_owned()));
        }
        state.flag_writes.push((survey_id, allowed));
        let survey = state
            .surveys
            .remove(&survey_id)
            .ok_or_else(|| AppError::NotFound(format!("survey '{survey_id}' does not exist")))?;
        state
            .surveys
            .insert(survey_id, survey.with_allow_edit_after_completion(allowed));
        Ok(())
    }

    async fn load_structure(&self, survey_id: SurveyId) -> AppResult<Vec<DataTable>> {
        let survey_row = row(json!({"sid": survey_id.value()}));
        Ok(vec![table("surveys", &[survey_row])])
    }
}

#[async_trait]
impl ResponseRepository for FakeSurveyStore {
    async fn response_columns(&self, survey_id: SurveyId) -> AppResult<Option<ResponseColumns>> {
        Ok(self
            .state
            .lock()
            .await
            .response_columns
            .get(&survey_id)
            .cloned()
            .map(ResponseColumns::new))
    }

    async fn find_responses(
        &self,
        survey_id: SurveyId,
        identifier: &ResponseIdentifier,
    ) -> AppResult<Vec<ResponseRecord>> {
        let state = self.state.lock().await;
        if state.fail_response_lookup {
            return Err(AppError::Internal("response lookup failed".to_owned()));
        }
        let rows = state.responses.get(&survey_id).cloned().unwrap_or_default();
        rows.into_iter()
            .filter(|row| match identifier {
                ResponseIdentifier::Id(id) => row_id(row) == Some(*id),
                ResponseIdentifier::Token(token) => {
                    row.get("token").and_then(Value::as_str) == Some(token.as_str())
                }
            })
            .map(ResponseRecord::from_row)
            .collect()
    }

    async fn save_response(&self, survey_id: SurveyId, record: &ResponseRecord) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let edits_allowed = state
            .surveys
            .get(&survey_id)
            .is_some_and(Survey::allows_edit_after_completion);
        let rows = state.responses.entry(survey_id).or_default();
        let Some(stored) = rows
            .iter_mut()
            .find(|row| row_id(row) == Some(record.id()))
        else {
            return Err(AppError::NotFound(format!(
                "response '{}' does not exist",
                record.id()
            )));
        };

        let stored_completed = stored.get("submitdate").is_some_and(|value| !value.is_null());
        if stored_completed && !edits_allowed {
            return Err(AppError::Validation(
                "completed responses cannot be edited".to_owned(),
            ));
        }
        if record
            .fields()
            .values()
            .any(|value| value.as_str() == Some("not-a-number"))
        {
            return Err(AppError::Validation("invalid value".to_owned()));
        }

        *stored = record.fields().clone();
        Ok(())
    }

    async fn delete_response(
        &self,
        survey_id: SurveyId,
        response_id: ResponseId,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        Ok(remove_row(state.responses.get_mut(&survey_id), response_id))
    }

    async fn delete_timing(&self, survey_id: SurveyId, response_id: ResponseId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        Ok(remove_row(state.timings.get_mut(&survey_id), response_id))
    }

    async fn read_partition(
        &self,
        survey_id: SurveyId,
        partition: SurveyPartition,
    ) -> AppResult<Option<DataTable>> {
        let state = self.state.lock().await;
        let (name, rows) = match partition {
            SurveyPartition::Responses => ("survey", state.responses.get(&survey_id)),
            SurveyPartition::Tokens => ("tokens", state.tokens.get(&survey_id)),
            SurveyPartition::Timings => ("timings", state.timings.get(&survey_id)),
        };

        Ok(rows.map(|rows| table(&format!("{name}_{survey_id}"), rows)))
    }
}

#[async_trait]
impl PermissionRepository for FakeSurveyStore {
    async fn list_grants(
        &self,
        user_id: UserId,
        scope: PermissionScope,
    ) -> AppResult<Vec<PermissionGrant>> {
        Ok(self
            .state
            .lock()
            .await
            .grants
            .get(&(user_id, scope))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl AuditRepository for FakeSurveyStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.state.lock().await.audit_events.push(event);
        Ok(())
    }
}

/// Observer recording every notification it receives.
#[derive(Default)]
pub(crate) struct RecordingObserver {
    events: Mutex<Vec<ResponseDeleteEvent>>,
}

impl RecordingObserver {
    pub(crate) async fn events(&self) -> Vec<ResponseDeleteEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl ResponseLifecycleObserver for RecordingObserver {
    async fn before_response_delete(&self, event: &ResponseDeleteEvent) {
        self.events.lock().await.push(*event);
    }
}
