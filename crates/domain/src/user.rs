use serde::{Deserialize, Serialize};
use surveyrpc_core::UserId;

/// Back-office user account, including its stored credential.
///
/// Deliberately not `Serialize`: the only serialisable view is [`UserProfile`].
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    profile: UserProfile,
    password_hash: String,
}

impl User {
    /// Creates a user from its public profile and stored credential hash.
    #[must_use]
    pub fn new(profile: UserProfile, password_hash: impl Into<String>) -> Self {
        Self {
            profile,
            password_hash: password_hash.into(),
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.profile.uid
    }

    /// Returns the stored credential hash.
    #[must_use]
    pub fn password_hash(&self) -> &str {
        self.password_hash.as_str()
    }

    /// Returns the attributes safe to hand back to the caller.
    #[must_use]
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Consumes the user, dropping the credential.
    #[must_use]
    pub fn into_profile(self) -> UserProfile {
        self.profile
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("User")
            .field("profile", &self.profile)
            .field("password_hash", &"***")
            .finish()
    }
}

/// User attributes returned by `get_me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Numeric user id.
    pub uid: UserId,
    /// Login name.
    pub users_name: String,
    /// Display name.
    pub full_name: String,
    /// Parent account that created this user.
    pub parent_id: i64,
    /// Preferred interface language.
    pub lang: String,
    /// Contact email.
    pub email: String,
    /// Account creation timestamp as stored by the host.
    pub created: Option<String>,
    /// Last modification timestamp as stored by the host.
    pub modified: Option<String>,
}

#[cfg(test)]
mod tests {
    use surveyrpc_core::UserId;

    use super::{User, UserProfile};

    fn sample_user() -> User {
        User::new(
            UserProfile {
                uid: UserId::new(1),
                users_name: "admin".to_owned(),
                full_name: "Administrator".to_owned(),
                parent_id: 0,
                lang: "en".to_owned(),
                email: "admin@example.com".to_owned(),
                created: None,
                modified: None,
            },
            "$argon2id$v=19$hash",
        )
    }

    #[test]
    fn serialised_profile_has_no_credential() {
        let user = sample_user();
        let value = serde_json::to_value(user.profile()).unwrap_or_default();
        let object = value.as_object().cloned().unwrap_or_default();

        assert!(!object.contains_key("password"));
        assert!(!object.contains_key("password_hash"));
        assert!(!value.to_string().contains("argon2id"));
        assert_eq!(object.get("users_name"), Some(&serde_json::json!("admin")));
    }

    #[test]
    fn debug_output_redacts_credential() {
        let rendered = format!("{:?}", sample_user());
        assert!(!rendered.contains("argon2id"));
    }
}
