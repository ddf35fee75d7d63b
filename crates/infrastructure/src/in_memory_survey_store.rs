use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use surveyrpc_application::{
    AuditEvent, AuditRepository, PermissionRepository, ResponseRepository, SessionRecord,
    SessionRepository, SurveyRepository, UserRepository,
};
use surveyrpc_core::{AppError, AppResult, SessionKey, SurveyId, UserId};
use surveyrpc_domain::{
    DataRow, DataTable, PermissionGrant, PermissionScope, ResponseColumns, ResponseId,
    ResponseIdentifier, ResponseRecord, Survey, SurveyPartition, User,
};

/// In-memory implementation of every storage port.
///
/// Mirrors the host's storage rules that matter to the remote-control
/// operations: completed responses can only be saved while the survey allows
/// edits after completion, and only declared columns can be written.
#[derive(Debug, Default)]
pub struct InMemorySurveyStore {
    surveys: RwLock<HashMap<SurveyId, Survey>>,
    structure: RwLock<HashMap<SurveyId, Vec<DataTable>>>,
    partitions: RwLock<HashMap<(SurveyId, SurveyPartition), DataTable>>,
    grants: RwLock<HashMap<(UserId, PermissionScope), Vec<PermissionGrant>>>,
    sessions: RwLock<HashMap<String, SessionRecord>>,
    users: RwLock<HashMap<UserId, User>>,
    audit_events: RwLock<Vec<AuditEvent>>,
}

impl InMemorySurveyStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a survey.
    pub async fn insert_survey(&self, survey: Survey) {
        self.surveys.write().await.insert(survey.id(), survey);
    }

    /// Appends a structure table (survey row, groups, questions) to a survey.
    pub async fn insert_structure_table(&self, survey_id: SurveyId, table: DataTable) {
        self.structure
            .write()
            .await
            .entry(survey_id)
            .or_default()
            .push(table);
    }

    /// Creates or replaces one partition of a survey.
    pub async fn insert_partition(
        &self,
        survey_id: SurveyId,
        partition: SurveyPartition,
        columns: &[&str],
        rows: Vec<DataRow>,
    ) {
        let name = match partition {
            SurveyPartition::Responses => "responses",
            SurveyPartition::Tokens => "tokens",
            SurveyPartition::Timings => "timings",
        };
        let columns = columns.iter().map(|column| (*column).to_owned()).collect();
        self.partitions
            .write()
            .await
            .insert((survey_id, partition), DataTable::new(name, columns, rows));
    }

    /// Adds a permission grant.
    pub async fn insert_grant(&self, user_id: UserId, grant: PermissionGrant) {
        self.grants
            .write()
            .await
            .entry((user_id, grant.scope))
            .or_default()
            .push(grant);
    }

    /// Stores a host-issued session.
    pub async fn insert_session(&self, session: SessionRecord) {
        self.sessions
            .write()
            .await
            .insert(session.key.as_str().to_owned(), session);
    }

    /// Stores a user account.
    pub async fn insert_user(&self, user: User) {
        self.users.write().await.insert(user.id(), user);
    }

    /// Returns the stored rows of a partition.
    pub async fn partition_rows(
        &self,
        survey_id: SurveyId,
        partition: SurveyPartition,
    ) -> Vec<DataRow> {
        self.partitions
            .read()
            .await
            .get(&(survey_id, partition))
            .map(|table| table.rows.clone())
            .unwrap_or_default()
    }

    /// Returns every appended audit event in order.
    pub async fn audit_events(&self) -> Vec<AuditEvent> {
        self.audit_events.read().await.clone()
    }

    async fn delete_row(
        &self,
        survey_id: SurveyId,
        partition: SurveyPartition,
        response_id: ResponseId,
    ) -> bool {
        let mut partitions = self.partitions.write().await;
        let Some(table) = partitions.get_mut(&(survey_id, partition)) else {
            return false;
        };

        let before = table.rows.len();
        table.rows.retain(|row| row_id(row) != Some(response_id));
        table.rows.len() != before
    }
}

fn row_id(row: &DataRow) -> Option<ResponseId> {
    row.get("id").and_then(ResponseId::from_value)
}

#[async_trait]
impl SurveyRepository for InMemorySurveyStore {
    async fn find_survey(&self, survey_id: SurveyId) -> AppResult<Option<Survey>> {
        Ok(self.surveys.read().await.get(&survey_id).cloned())
    }

    async fn set_allow_edit_after_completion(
        &self,
        survey_id: SurveyId,
        allowed: bool,
    ) -> AppResult<()> {
        let mut surveys = self.surveys.write().await;
        let survey = surveys
            .remove(&survey_id)
            .ok_or_else(|| AppError::NotFound(format!("survey '{survey_id}' does not exist")))?;
        surveys.insert(survey_id, survey.with_allow_edit_after_completion(allowed));

        Ok(())
    }

    async fn load_structure(&self, survey_id: SurveyId) -> AppResult<Vec<DataTable>> {
        Ok(self
            .structure
            .read()
            .await
            .get(&survey_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl ResponseRepository for InMemorySurveyStore {
    async fn response_columns(&self, survey_id: SurveyId) -> AppResult<Option<ResponseColumns>> {
        Ok(self
            .partitions
            .read()
            .await
            .get(&(survey_id, SurveyPartition::Responses))
            .map(|table| ResponseColumns::new(table.columns.clone())))
    }

    async fn find_responses(
        &self,
        survey_id: SurveyId,
        identifier: &ResponseIdentifier,
    ) -> AppResult<Vec<ResponseRecord>> {
        let partitions = self.partitions.read().await;
        let Some(table) = partitions.get(&(survey_id, SurveyPartition::Responses)) else {
            return Ok(Vec::new());
        };

        table
            .rows
            .iter()
            .filter(|row| match identifier {
                ResponseIdentifier::Id(response_id) => row_id(row) == Some(*response_id),
                ResponseIdentifier::Token(token) => {
                    row.get("token").and_then(Value::as_str) == Some(token.as_str())
                }
            })
            .cloned()
            .map(ResponseRecord::from_row)
            .collect()
    }

    async fn save_response(&self, survey_id: SurveyId, record: &ResponseRecord) -> AppResult<()> {
        let edits_allowed = self
            .surveys
            .read()
            .await
            .get(&survey_id)
            .is_some_and(Survey::allows_edit_after_completion);

        let mut partitions = self.partitions.write().await;
        let table = partitions
            .get_mut(&(survey_id, SurveyPartition::Responses))
            .ok_or_else(|| {
                AppError::NotFound(format!("survey '{survey_id}' has no response table"))
            })?;

        if let Some(unknown) = record
            .fields()
            .keys()
            .find(|name| !table.columns.contains(*name))
        {
            return Err(AppError::Validation(format!(
                "column '{unknown}' does not exist"
            )));
        }

        let stored = table
            .rows
            .iter_mut()
            .find(|row| row_id(row) == Some(record.id()))
            .ok_or_else(|| {
                AppError::Conflict(format!("response '{}' no longer exists", record.id()))
            })?;
        if ResponseRecord::from_row(stored.clone())?.is_completed() && !edits_allowed {
            return Err(AppError::Validation(format!(
                "response '{}' is completed and survey '{survey_id}' forbids editing it",
                record.id()
            )));
        }

        *stored = record.fields().clone();
        Ok(())
    }

    async fn delete_response(
        &self,
        survey_id: SurveyId,
        response_id: ResponseId,
    ) -> AppResult<bool> {
        Ok(self
            .delete_row(survey_id, SurveyPartition::Responses, response_id)
            .await)
    }

    async fn delete_timing(&self, survey_id: SurveyId, response_id: ResponseId) -> AppResult<bool> {
        Ok(self
            .delete_row(survey_id, SurveyPartition::Timings, response_id)
            .await)
    }

    async fn read_partition(
        &self,
        survey_id: SurveyId,
        partition: SurveyPartition,
    ) -> AppResult<Option<DataTable>> {
        Ok(self
            .partitions
            .read()
            .await
            .get(&(survey_id, partition))
            .cloned())
    }
}

#[async_trait]
impl PermissionRepository for InMemorySurveyStore {
    async fn list_grants(
        &self,
        user_id: UserId,
        scope: PermissionScope,
    ) -> AppResult<Vec<PermissionGrant>> {
        Ok(self
            .grants
            .read()
            .await
            .get(&(user_id, scope))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl AuditRepository for InMemorySurveyStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.audit_events.write().await.push(event);
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for InMemorySurveyStore {
    async fn find_session(&self, key: &SessionKey) -> AppResult<Option<SessionRecord>> {
        Ok(self.sessions.read().await.get(key.as_str()).cloned())
    }
}

#[async_trait]
impl UserRepository for InMemorySurveyStore {
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }
}
