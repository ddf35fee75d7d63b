//! User lookup port and `get_me` service.

use std::sync::Arc;

use async_trait::async_trait;

use surveyrpc_core::{AppResult, CallContext, UserId};
use surveyrpc_domain::{User, UserProfile};

/// Repository port for back-office user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by id.
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>>;
}

/// Application service exposing the caller's own account.
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    /// Creates a new user service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Returns the caller's profile without its credential, if the account still exists.
    pub async fn current_profile(&self, context: &CallContext) -> AppResult<Option<UserProfile>> {
        Ok(self
            .repository
            .find_by_id(context.user_id())
            .await?
            .map(User::into_profile))
    }
}
