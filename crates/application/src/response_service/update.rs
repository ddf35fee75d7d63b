use surveyrpc_core::{AppError, AppResult, CallContext, SurveyId};
use surveyrpc_domain::{
    AuditAction, CrudVerb, DataRow, RESPONSES_PERMISSION, ResponseIdentifier, ResponseUpdate,
    RpcOutcome, RpcStatus,
};
use tracing::{info, warn};

use crate::AuditEvent;

use super::ResponseService;
use super::edit_override::EditAfterCompletionOverride;

impl ResponseService {
    /// Updates exactly one response row of an active survey.
    ///
    /// The survey's edit-after-completion flag is forced on while the update
    /// runs and restored before returning, whatever the outcome.
    pub async fn update_response(
        &self,
        context: &CallContext,
        survey_id: SurveyId,
        fields: DataRow,
    ) -> AppResult<RpcOutcome<()>> {
        let Some(survey) = self.survey_repository.find_survey(survey_id).await? else {
            return Ok(Err(RpcStatus::InvalidSurvey));
        };
        if !survey.is_active() {
            return Ok(Err(RpcStatus::SurveyNotActive));
        }

        let edit_override =
            EditAfterCompletionOverride::engage(self.survey_repository.as_ref(), &survey).await?;
        let outcome = self
            .update_with_edits_allowed(context, survey_id, fields)
            .await;
        let restored = edit_override.restore().await;

        let outcome = outcome?;
        restored?;

        match &outcome {
            Ok(()) => info!(%survey_id, user_id = %context.user_id(), "response updated"),
            Err(status) => warn!(%survey_id, status = %status.message(), "response update rejected"),
        }

        Ok(outcome)
    }

    async fn update_with_edits_allowed(
        &self,
        context: &CallContext,
        survey_id: SurveyId,
        fields: DataRow,
    ) -> AppResult<RpcOutcome<()>> {
        let allowed = self
            .authorization_service
            .has_survey_permission(context, survey_id, RESPONSES_PERMISSION, CrudVerb::Update)
            .await?;
        if !allowed {
            return Ok(Err(RpcStatus::NoPermission));
        }

        let Some(columns) = self.response_repository.response_columns(survey_id).await? else {
            return Ok(Err(RpcStatus::NoResponseTable));
        };

        let Some(identifier) = ResponseIdentifier::from_fields(&fields) else {
            return Ok(Err(RpcStatus::MissingResponseIdentifier));
        };

        let mut matches = self
            .response_repository
            .find_responses(survey_id, &identifier)
            .await?;
        if matches.len() > 1 {
            return Ok(Err(RpcStatus::MultipleMatchingResponses));
        }
        let Some(mut record) = matches.pop() else {
            return Ok(Err(RpcStatus::NoMatchingResponse));
        };

        let update = match ResponseUpdate::validate(&columns, fields) {
            Ok(update) => update,
            Err(invalid) => return Ok(Err(RpcStatus::InvalidColumns(invalid.names().to_vec()))),
        };
        record.apply(&update);

        match self
            .response_repository
            .save_response(survey_id, &record)
            .await
        {
            Ok(()) => {}
            Err(AppError::Validation(reason) | AppError::Conflict(reason)) => {
                warn!(%survey_id, response_id = %record.id(), %reason, "response save rejected");
                return Ok(Err(RpcStatus::UnableToEditResponse));
            }
            Err(error) => return Err(error),
        }

        self.audit_repository
            .append_event(AuditEvent {
                user_id: context.user_id(),
                action: AuditAction::ResponseUpdated,
                survey_id,
                resource_id: record.id().to_string(),
                detail: Some(format!(
                    "updated fields: {}",
                    update
                        .assignments()
                        .keys()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", ")
                )),
            })
            .await?;

        Ok(Ok(()))
    }
}
