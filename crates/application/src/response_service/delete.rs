use surveyrpc_core::{AppResult, CallContext, SurveyId};
use surveyrpc_domain::{
    AuditAction, CrudVerb, RESPONSES_PERMISSION, ResponseId, RpcOutcome, RpcStatus,
};
use tracing::{info, warn};

use crate::{AuditEvent, ResponseDeleteEvent};

use super::ResponseService;

/// Per-batch deletion counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletionReport {
    /// Identifiers received.
    pub requested: usize,
    /// Response rows removed.
    pub deleted: usize,
    /// Identifiers that matched no row.
    pub errors: usize,
    /// Timing rows that could not be removed.
    pub timing_errors: usize,
}

impl DeletionReport {
    /// Returns whether every row and timing row was removed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors == 0 && self.timing_errors == 0
    }
}

impl ResponseService {
    /// Deletes response rows one by one after a single permission check.
    ///
    /// The batch is not transactional: rows deleted before a failing id stay
    /// deleted.
    pub async fn delete_responses(
        &self,
        context: &CallContext,
        survey_id: SurveyId,
        response_ids: Vec<ResponseId>,
    ) -> AppResult<RpcOutcome<DeletionReport>> {
        let Some(survey) = self.survey_repository.find_survey(survey_id).await? else {
            return Ok(Err(RpcStatus::InvalidSurvey));
        };

        let allowed = self
            .authorization_service
            .has_survey_permission(context, survey_id, RESPONSES_PERMISSION, CrudVerb::Delete)
            .await?;
        if !allowed {
            return Ok(Err(RpcStatus::NoPermission));
        }

        let mut report = DeletionReport {
            requested: response_ids.len(),
            ..DeletionReport::default()
        };

        for response_id in response_ids {
            self.events
                .before_response_delete(&ResponseDeleteEvent {
                    survey_id,
                    response_id,
                    user_id: context.user_id(),
                })
                .await;

            let deleted = self
                .response_repository
                .delete_response(survey_id, response_id)
                .await?;
            if !deleted {
                report.errors += 1;
                continue;
            }
            report.deleted += 1;

            self.audit_repository
                .append_event(AuditEvent {
                    user_id: context.user_id(),
                    action: AuditAction::ResponseDeleted,
                    survey_id,
                    resource_id: response_id.to_string(),
                    detail: None,
                })
                .await?;

            if survey.saves_timings()
                && !self
                    .response_repository
                    .delete_timing(survey_id, response_id)
                    .await?
            {
                report.timing_errors += 1;
            }
        }

        if report.is_clean() {
            info!(%survey_id, deleted = report.deleted, "responses deleted");
        } else {
            warn!(
                %survey_id,
                deleted = report.deleted,
                errors = report.errors,
                timing_errors = report.timing_errors,
                "response deletion finished with errors"
            );
        }

        Ok(Ok(report))
    }
}
