//! PostgreSQL-backed user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use surveyrpc_application::UserRepository;
use surveyrpc_core::{AppError, AppResult, UserId};
use surveyrpc_domain::{User, UserProfile};

/// Timestamp layout the host application stores and returns.
const HOST_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    uid: i64,
    users_name: String,
    password: String,
    full_name: String,
    parent_id: i64,
    lang: String,
    email: String,
    created: Option<DateTime<Utc>>,
    modified: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let host_timestamp = |value: DateTime<Utc>| value.format(HOST_TIMESTAMP_FORMAT).to_string();
        User::new(
            UserProfile {
                uid: UserId::new(row.uid),
                users_name: row.users_name,
                full_name: row.full_name,
                parent_id: row.parent_id,
                lang: row.lang,
                email: row.email,
                created: row.created.map(host_timestamp),
                modified: row.modified.map(host_timestamp),
            },
            row.password,
        )
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT uid, users_name, password, full_name, parent_id, lang, email, created, modified
            FROM users
            WHERE uid = $1
            "#,
        )
        .bind(user_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user by id: {error}")))?;

        Ok(row.map(User::from))
    }
}
