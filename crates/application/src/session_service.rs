//! Session validation ports and application service.
//!
//! Session keys are issued by the host application; this service only
//! decides whether a presented key currently resolves to a principal.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use surveyrpc_core::{AppResult, CallContext, SessionKey, UserId};

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Stored session row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// Opaque session key.
    pub key: SessionKey,
    /// Principal the session was issued to.
    pub user_id: UserId,
    /// Instant after which the key is no longer accepted.
    pub expires_at: DateTime<Utc>,
}

/// Repository port for reading host-issued sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Finds a stored session by key, expired or not.
    async fn find_session(&self, key: &SessionKey) -> AppResult<Option<SessionRecord>>;
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Application service validating session keys.
#[derive(Clone)]
pub struct SessionService {
    repository: Arc<dyn SessionRepository>,
}

impl SessionService {
    /// Creates a new session service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// Resolves a session key into a call context.
    ///
    /// Returns `None` for blank, unknown and expired keys. Never mutates the
    /// session store.
    pub async fn validate(&self, key: &SessionKey) -> AppResult<Option<CallContext>> {
        if key.as_str().trim().is_empty() {
            return Ok(None);
        }

        let now = Utc::now();
        Ok(self
            .repository
            .find_session(key)
            .await?
            .filter(|session| session.expires_at > now)
            .map(|session| CallContext::new(session.user_id)))
    }
}
