use std::sync::Arc;

use async_trait::async_trait;
use surveyrpc_core::{AppResult, CallContext, SurveyId, UserId};
use surveyrpc_domain::{CrudVerb, PermissionGrant, PermissionScope, SUPERADMIN_PERMISSION};

use crate::SurveyRepository;

/// Repository port for stored permission rows.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Lists the grants a user holds in one scope.
    async fn list_grants(
        &self,
        user_id: UserId,
        scope: PermissionScope,
    ) -> AppResult<Vec<PermissionGrant>>;
}

/// Application service answering global and per-survey permission questions.
#[derive(Clone)]
pub struct AuthorizationService {
    repository: Arc<dyn PermissionRepository>,
    survey_repository: Arc<dyn SurveyRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn PermissionRepository>,
        survey_repository: Arc<dyn SurveyRepository>,
    ) -> Self {
        Self {
            repository,
            survey_repository,
        }
    }

    /// Returns whether the caller holds a global permission.
    pub async fn has_global_permission(
        &self,
        context: &CallContext,
        permission: &str,
        verb: CrudVerb,
    ) -> AppResult<bool> {
        let grants = self
            .repository
            .list_grants(context.user_id(), PermissionScope::Global)
            .await?;

        Ok(is_superadmin(&grants)
            || grants.iter().any(|grant| grant.grants(permission, verb)))
    }

    /// Returns whether the caller holds a permission on one survey.
    ///
    /// Superadmins and the survey owner hold every survey permission. Unknown
    /// surveys yield `false`.
    pub async fn has_survey_permission(
        &self,
        context: &CallContext,
        survey_id: SurveyId,
        permission: &str,
        verb: CrudVerb,
    ) -> AppResult<bool> {
        let Some(survey) = self.survey_repository.find_survey(survey_id).await? else {
            return Ok(false);
        };

        let global_grants = self
            .repository
            .list_grants(context.user_id(), PermissionScope::Global)
            .await?;
        if is_superadmin(&global_grants) || survey.owner_id() == context.user_id() {
            return Ok(true);
        }

        let survey_grants = self
            .repository
            .list_grants(context.user_id(), PermissionScope::Survey(survey_id))
            .await?;

        Ok(survey_grants
            .iter()
            .any(|grant| grant.grants(permission, verb)))
    }
}

fn is_superadmin(global_grants: &[PermissionGrant]) -> bool {
    global_grants
        .iter()
        .any(|grant| grant.grants(SUPERADMIN_PERMISSION, CrudVerb::Read))
}
