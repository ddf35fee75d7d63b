use surveyrpc_core::{AppResult, SurveyId};
use surveyrpc_domain::Survey;
use tracing::warn;

use crate::SurveyRepository;

/// Forces "allow edit after completion" on for the duration of one update.
///
/// Must be released with [`EditAfterCompletionOverride::restore`]; the stored
/// flag is then back to the value it had when the override was engaged.
pub(super) struct EditAfterCompletionOverride<'a> {
    repository: &'a dyn SurveyRepository,
    survey_id: SurveyId,
    previous: bool,
    restored: bool,
}

impl<'a> EditAfterCompletionOverride<'a> {
    pub(super) async fn engage(
        repository: &'a dyn SurveyRepository,
        survey: &Survey,
    ) -> AppResult<Self> {
        let previous = survey.allows_edit_after_completion();
        if !previous {
            repository
                .set_allow_edit_after_completion(survey.id(), true)
                .await?;
        }

        Ok(Self {
            repository,
            survey_id: survey.id(),
            previous,
            restored: false,
        })
    }

    pub(super) async fn restore(mut self) -> AppResult<()> {
        self.restored = true;
        if self.previous {
            return Ok(());
        }

        self.repository
            .set_allow_edit_after_completion(self.survey_id, self.previous)
            .await
    }
}

impl Drop for EditAfterCompletionOverride<'_> {
    fn drop(&mut self) {
        if !self.restored && !self.previous {
            warn!(
                survey_id = %self.survey_id,
                "edit-after-completion override dropped before restore"
            );
        }
    }
}
