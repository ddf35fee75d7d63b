//! Remote-control entry points.
//!
//! Every operation resolves the session key first. An invalid key yields
//! [`RpcStatus::InvalidSession`] before any other check or mutation.

use serde_json::Value;
use surveyrpc_core::{AppResult, CallContext, SessionKey, SurveyId};
use surveyrpc_domain::{CrudVerb, DataRow, ResponseId, RpcOutcome, RpcStatus, UserProfile};
use tracing::warn;

use crate::{
    AuthorizationService, ResponseService, SessionService, SurveyArchive, SurveyExportService,
    UserService,
};

/// Services composed behind the remote-control surface.
#[derive(Clone)]
pub struct RemoteControlService {
    session_service: SessionService,
    user_service: UserService,
    authorization_service: AuthorizationService,
    export_service: SurveyExportService,
    response_service: ResponseService,
}

impl RemoteControlService {
    /// Creates the remote-control façade.
    #[must_use]
    pub fn new(
        session_service: SessionService,
        user_service: UserService,
        authorization_service: AuthorizationService,
        export_service: SurveyExportService,
        response_service: ResponseService,
    ) -> Self {
        Self {
            session_service,
            user_service,
            authorization_service,
            export_service,
            response_service,
        }
    }

    async fn authenticate(&self, session_key: &SessionKey) -> AppResult<RpcOutcome<CallContext>> {
        Ok(self
            .session_service
            .validate(session_key)
            .await?
            .ok_or(RpcStatus::InvalidSession))
    }

    /// Returns the caller's profile, or `None` for an invalid session or a deleted account.
    pub async fn get_me(&self, session_key: &SessionKey) -> AppResult<Option<UserProfile>> {
        let Ok(context) = self.authenticate(session_key).await? else {
            return Ok(None);
        };

        self.user_service.current_profile(&context).await
    }

    /// Checks a global permission for the caller.
    pub async fn has_global_permission(
        &self,
        session_key: &SessionKey,
        permission: &str,
        verb: &str,
    ) -> AppResult<RpcOutcome<bool>> {
        let context = match self.authenticate(session_key).await? {
            Ok(context) => context,
            Err(status) => return Ok(Err(status)),
        };
        let Ok(verb) = CrudVerb::from_transport(verb) else {
            return Ok(Err(RpcStatus::InvalidCrudVerb(verb.to_owned())));
        };

        self.authorization_service
            .has_global_permission(&context, permission, verb)
            .await
            .map(Ok)
    }

    /// Checks a survey-scoped permission for the caller.
    pub async fn has_survey_permission(
        &self,
        session_key: &SessionKey,
        survey_id: SurveyId,
        permission: &str,
        verb: &str,
    ) -> AppResult<RpcOutcome<bool>> {
        let context = match self.authenticate(session_key).await? {
            Ok(context) => context,
            Err(status) => return Ok(Err(status)),
        };
        let Ok(verb) = CrudVerb::from_transport(verb) else {
            return Ok(Err(RpcStatus::InvalidCrudVerb(verb.to_owned())));
        };

        self.authorization_service
            .has_survey_permission(&context, survey_id, permission, verb)
            .await
            .map(Ok)
    }

    /// Packages a survey into an archive.
    pub async fn export_survey(
        &self,
        session_key: &SessionKey,
        survey_id: SurveyId,
    ) -> AppResult<RpcOutcome<SurveyArchive>> {
        let context = match self.authenticate(session_key).await? {
            Ok(context) => context,
            Err(status) => return Ok(Err(status)),
        };

        self.export_service.export_survey(&context, survey_id).await
    }

    /// Updates one response row.
    pub async fn update_response(
        &self,
        session_key: &SessionKey,
        survey_id: SurveyId,
        fields: DataRow,
    ) -> AppResult<RpcOutcome<()>> {
        let context = match self.authenticate(session_key).await? {
            Ok(context) => context,
            Err(status) => return Ok(Err(status)),
        };

        self.response_service
            .update_response(&context, survey_id, fields)
            .await
    }

    /// Deletes one response or a list of responses.
    ///
    /// Entries are cast like any transport integer, so an unusable entry is
    /// attempted as row `0` and counted as a miss while the rest of the batch
    /// proceeds. A batch that leaves missing rows or timing rows behind
    /// reports [`RpcStatus::DeletionFailed`].
    pub async fn delete_responses(
        &self,
        session_key: &SessionKey,
        survey_id: SurveyId,
        selection: &Value,
    ) -> AppResult<RpcOutcome<()>> {
        let context = match self.authenticate(session_key).await? {
            Ok(context) => context,
            Err(status) => return Ok(Err(status)),
        };
        let response_ids = ResponseId::list_from_value(selection);

        let report = match self
            .response_service
            .delete_responses(&context, survey_id, response_ids)
            .await?
        {
            Ok(report) => report,
            Err(status) => return Ok(Err(status)),
        };

        if report.is_clean() {
            Ok(Ok(()))
        } else {
            warn!(
                %survey_id,
                requested = report.requested,
                errors = report.errors,
                timing_errors = report.timing_errors,
                "response deletion incomplete"
            );
            Ok(Err(RpcStatus::DeletionFailed))
        }
    }
}
