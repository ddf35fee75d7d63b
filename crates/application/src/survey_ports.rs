use async_trait::async_trait;
use surveyrpc_core::{AppResult, SurveyId, UserId};
use surveyrpc_domain::{
    AuditAction, DataTable, ResponseColumns, ResponseId, ResponseIdentifier, ResponseRecord,
    Survey, SurveyPartition,
};

/// Repository port for survey settings and structure.
#[async_trait]
pub trait SurveyRepository: Send + Sync {
    /// Looks up a survey by id.
    async fn find_survey(&self, survey_id: SurveyId) -> AppResult<Option<Survey>>;

    /// Persists the allow-edit-after-completion flag.
    async fn set_allow_edit_after_completion(
        &self,
        survey_id: SurveyId,
        allowed: bool,
    ) -> AppResult<()>;

    /// Loads the structure tables (survey settings, groups, questions) in document order.
    async fn load_structure(&self, survey_id: SurveyId) -> AppResult<Vec<DataTable>>;
}

/// Repository port for the per-survey partitions.
#[async_trait]
pub trait ResponseRepository: Send + Sync {
    /// Returns the declared response columns, or `None` when the partition is missing.
    async fn response_columns(&self, survey_id: SurveyId) -> AppResult<Option<ResponseColumns>>;

    /// Returns every response row matching the identifier.
    async fn find_responses(
        &self,
        survey_id: SurveyId,
        identifier: &ResponseIdentifier,
    ) -> AppResult<Vec<ResponseRecord>>;

    /// Persists a modified response row.
    ///
    /// Storage-level rejections (type mismatches, completed responses on a
    /// survey that forbids edits after completion) are reported as
    /// `AppError::Validation`.
    async fn save_response(&self, survey_id: SurveyId, record: &ResponseRecord) -> AppResult<()>;

    /// Deletes a response row. Returns `false` when no row existed.
    async fn delete_response(&self, survey_id: SurveyId, response_id: ResponseId)
    -> AppResult<bool>;

    /// Deletes the timing row of a response. Returns `false` when no row existed.
    async fn delete_timing(&self, survey_id: SurveyId, response_id: ResponseId) -> AppResult<bool>;

    /// Reads a whole partition, or `None` when it does not exist.
    async fn read_partition(
        &self,
        survey_id: SurveyId,
        partition: SurveyPartition,
    ) -> AppResult<Option<DataTable>>;
}

/// Immutable audit event payload emitted by application services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Principal that performed the action.
    pub user_id: UserId,
    /// Stable audit action identifier.
    pub action: AuditAction,
    /// Survey the action touched.
    pub survey_id: SurveyId,
    /// Resource identifier within the survey.
    pub resource_id: String,
    /// Optional audit detail payload.
    pub detail: Option<String>,
}

/// Port for persisting append-only audit events.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Persists one audit event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}
