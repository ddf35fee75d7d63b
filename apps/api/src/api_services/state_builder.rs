use std::path::Path;
use std::sync::Arc;

use sqlx::PgPool;
use surveyrpc_application::{
    ArchiveBuilder, AuditRepository, AuthorizationService, DocumentWriter, PermissionRepository,
    RemoteControlService, ResponseEventDispatcher, ResponseRepository, ResponseService,
    SessionRepository, SessionService, SurveyExportService, SurveyRepository, UserRepository,
    UserService,
};
use surveyrpc_core::AppError;
use surveyrpc_infrastructure::{
    PartitionNames, PostgresAuditRepository, PostgresPermissionRepository,
    PostgresResponseRepository, PostgresSessionRepository, PostgresSurveyRepository,
    PostgresUserRepository, TracingResponseObserver, XmlDocumentWriter, ZipArchiveBuilder,
};

use crate::api_config::ApiConfig;
use crate::state::AppState;

/// Storage ports the remote-control services are composed from.
struct StoragePorts {
    sessions: Arc<dyn SessionRepository>,
    users: Arc<dyn UserRepository>,
    permissions: Arc<dyn PermissionRepository>,
    surveys: Arc<dyn SurveyRepository>,
    responses: Arc<dyn ResponseRepository>,
    audit: Arc<dyn AuditRepository>,
}

fn remote_control_service(ports: StoragePorts, export_temp_dir: &Path) -> RemoteControlService {
    let authorization_service =
        AuthorizationService::new(ports.permissions, ports.surveys.clone());
    let document_writer: Arc<dyn DocumentWriter> = Arc::new(XmlDocumentWriter::new());
    let archive_builder: Arc<dyn ArchiveBuilder> =
        Arc::new(ZipArchiveBuilder::new(export_temp_dir));

    let export_service = SurveyExportService::new(
        ports.surveys.clone(),
        ports.responses.clone(),
        document_writer,
        archive_builder,
        ports.audit.clone(),
    );
    let response_service = ResponseService::new(
        ports.surveys,
        ports.responses,
        authorization_service.clone(),
        ports.audit,
        ResponseEventDispatcher::new().with_observer(Arc::new(TracingResponseObserver)),
    );

    RemoteControlService::new(
        SessionService::new(ports.sessions),
        UserService::new(ports.users),
        authorization_service,
        export_service,
        response_service,
    )
}

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let partition_names = PartitionNames::new(config.survey_table_prefix.clone())?;

    let ports = StoragePorts {
        sessions: Arc::new(PostgresSessionRepository::new(pool.clone())),
        users: Arc::new(PostgresUserRepository::new(pool.clone())),
        permissions: Arc::new(PostgresPermissionRepository::new(pool.clone())),
        surveys: Arc::new(PostgresSurveyRepository::new(pool.clone())),
        responses: Arc::new(PostgresResponseRepository::new(
            pool.clone(),
            partition_names,
        )),
        audit: Arc::new(PostgresAuditRepository::new(pool.clone())),
    };

    Ok(AppState {
        remote_control: remote_control_service(ports, &config.export_temp_dir),
        postgres_pool: Some(pool),
    })
}

#[cfg(test)]
pub fn build_in_memory_state(
    store: Arc<surveyrpc_infrastructure::InMemorySurveyStore>,
    export_temp_dir: &Path,
) -> AppState {
    let ports = StoragePorts {
        sessions: store.clone(),
        users: store.clone(),
        permissions: store.clone(),
        surveys: store.clone(),
        responses: store.clone(),
        audit: store,
    };

    AppState {
        remote_control: remote_control_service(ports, export_temp_dir),
        postgres_pool: None,
    }
}
