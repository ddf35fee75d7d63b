use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use surveyrpc_application::{SessionRecord, SessionRepository};
use surveyrpc_core::{AppError, AppResult, SessionKey, UserId};

/// PostgreSQL reader for host-issued sessions.
#[derive(Clone)]
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: String,
    user_id: i64,
    expires_at: DateTime<Utc>,
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn find_session(&self, key: &SessionKey) -> AppResult<Option<SessionRecord>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, user_id, expires_at
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find session: {error}")))?;

        Ok(row.map(|row| SessionRecord {
            key: SessionKey::new(row.id),
            user_id: UserId::new(row.user_id),
            expires_at: row.expires_at,
        }))
    }
}
