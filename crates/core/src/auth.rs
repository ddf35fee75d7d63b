use std::fmt::{Debug, Formatter};

use serde::{Deserialize, Serialize};

use crate::UserId;

/// Opaque bearer token issued by the host application's session store.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    /// Wraps a transport value as a session key.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Debug for SessionKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("SessionKey(***)")
    }
}

/// Explicit per-call context resolved from a valid session.
///
/// Services receive this value instead of reading ambient session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    user_id: UserId,
}

impl CallContext {
    /// Creates a call context for an authenticated principal.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    /// Returns the authenticated principal.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}
