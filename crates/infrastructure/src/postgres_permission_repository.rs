use async_trait::async_trait;
use sqlx::PgPool;

use surveyrpc_application::PermissionRepository;
use surveyrpc_core::{AppError, AppResult, UserId};
use surveyrpc_domain::{CrudFlags, PermissionGrant, PermissionScope};

/// PostgreSQL implementation of the permission repository port.
#[derive(Clone)]
pub struct PostgresPermissionRepository {
    pool: PgPool,
}

impl PostgresPermissionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PermissionRow {
    permission: String,
    create_p: bool,
    read_p: bool,
    update_p: bool,
    delete_p: bool,
    import_p: bool,
    export_p: bool,
}

#[async_trait]
impl PermissionRepository for PostgresPermissionRepository {
    async fn list_grants(
        &self,
        user_id: UserId,
        scope: PermissionScope,
    ) -> AppResult<Vec<PermissionGrant>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT permission, create_p, read_p, update_p, delete_p, import_p, export_p
            FROM permissions
            WHERE uid = $1
              AND entity = $2
              AND entity_id = $3
            ORDER BY permission
            "#,
        )
        .bind(user_id.value())
        .bind(scope.entity())
        .bind(scope.entity_id())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list {} permissions for user '{user_id}': {error}",
                scope.entity()
            ))
        })?;

        Ok(rows
            .into_iter()
            .map(|row| PermissionGrant {
                scope,
                permission: row.permission,
                flags: CrudFlags {
                    create: row.create_p,
                    read: row.read_p,
                    update: row.update_p,
                    delete: row.delete_p,
                    import: row.import_p,
                    export: row.export_p,
                },
            })
            .collect())
    }
}
