use surveyrpc_application::RemoteControlService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub remote_control: RemoteControlService,
    /// Connection pool probed by the health check; `None` for in-memory storage.
    pub postgres_pool: Option<sqlx::PgPool>,
}
