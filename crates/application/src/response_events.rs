use std::sync::Arc;

use async_trait::async_trait;
use surveyrpc_core::{SurveyId, UserId};
use surveyrpc_domain::ResponseId;

/// Notification emitted right before a response row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseDeleteEvent {
    /// Survey owning the response.
    pub survey_id: SurveyId,
    /// Response about to be deleted.
    pub response_id: ResponseId,
    /// Principal requesting the deletion.
    pub user_id: UserId,
}

/// Extension point for code that reacts to response lifecycle changes.
#[async_trait]
pub trait ResponseLifecycleObserver: Send + Sync {
    /// Called before each response deletion attempt, whether or not the row exists.
    async fn before_response_delete(&self, event: &ResponseDeleteEvent);
}

/// Fans lifecycle notifications out to every registered observer, in order.
#[derive(Clone, Default)]
pub struct ResponseEventDispatcher {
    observers: Vec<Arc<dyn ResponseLifecycleObserver>>,
}

impl ResponseEventDispatcher {
    /// Creates a dispatcher without observers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ResponseLifecycleObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Notifies every observer of an imminent deletion.
    pub async fn before_response_delete(&self, event: &ResponseDeleteEvent) {
        for observer in &self.observers {
            observer.before_response_delete(event).await;
        }
    }
}
