use serde::{Deserialize, Serialize};
use surveyrpc_core::{SurveyId, UserId};

/// Survey settings consulted by the remote-control operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survey {
    id: SurveyId,
    owner_id: UserId,
    active: bool,
    allow_edit_after_completion: bool,
    save_timings: bool,
}

impl Survey {
    /// Creates a survey settings snapshot.
    #[must_use]
    pub fn new(
        id: SurveyId,
        owner_id: UserId,
        active: bool,
        allow_edit_after_completion: bool,
        save_timings: bool,
    ) -> Self {
        Self {
            id,
            owner_id,
            active,
            allow_edit_after_completion,
            save_timings,
        }
    }

    /// Returns the survey identifier.
    #[must_use]
    pub fn id(&self) -> SurveyId {
        self.id
    }

    /// Returns the user owning the survey.
    #[must_use]
    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    /// Returns whether the survey is collecting responses.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns whether submitted responses may still be modified.
    #[must_use]
    pub fn allows_edit_after_completion(&self) -> bool {
        self.allow_edit_after_completion
    }

    /// Returns a copy with a different edit-after-completion setting.
    #[must_use]
    pub fn with_allow_edit_after_completion(mut self, allowed: bool) -> Self {
        self.allow_edit_after_completion = allowed;
        self
    }

    /// Returns whether per-response timing rows are recorded.
    #[must_use]
    pub fn saves_timings(&self) -> bool {
        self.save_timings
    }
}

/// Survey-specific storage partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurveyPartition {
    /// Response rows, created when the survey is activated.
    Responses,
    /// Participant token rows.
    Tokens,
    /// Per-response timing rows.
    Timings,
}

impl SurveyPartition {
    /// Returns all partitions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::Responses, Self::Tokens, Self::Timings]
    }
}
