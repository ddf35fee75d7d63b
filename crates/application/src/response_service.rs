//! Response mutation and deletion use-cases.

use std::sync::Arc;

use crate::{
    AuditRepository, AuthorizationService, ResponseEventDispatcher, ResponseRepository,
    SurveyRepository,
};

mod delete;
mod edit_override;
mod update;

pub use delete::DeletionReport;

/// Application service for response updates and deletions.
#[derive(Clone)]
pub struct ResponseService {
    survey_repository: Arc<dyn SurveyRepository>,
    response_repository: Arc<dyn ResponseRepository>,
    authorization_service: AuthorizationService,
    audit_repository: Arc<dyn AuditRepository>,
    events: ResponseEventDispatcher,
}

impl ResponseService {
    /// Creates a new response service.
    #[must_use]
    pub fn new(
        survey_repository: Arc<dyn SurveyRepository>,
        response_repository: Arc<dyn ResponseRepository>,
        authorization_service: AuthorizationService,
        audit_repository: Arc<dyn AuditRepository>,
        events: ResponseEventDispatcher,
    ) -> Self {
        Self {
            survey_repository,
            response_repository,
            authorization_service,
            audit_repository,
            events,
        }
    }
}
