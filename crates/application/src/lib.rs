//! Application services and ports.

#![forbid(unsafe_code)]

mod authorization_service;
mod export_ports;
mod remote_control_service;
mod response_events;
mod response_service;
mod session_service;
mod survey_export_service;
mod survey_ports;
mod user_service;

#[cfg(test)]
mod test_support;

pub use authorization_service::{AuthorizationService, PermissionRepository};
pub use export_ports::{ArchiveBuilder, ArchiveWriter, DocumentWriter};
pub use remote_control_service::RemoteControlService;
pub use response_events::{
    ResponseDeleteEvent, ResponseEventDispatcher, ResponseLifecycleObserver,
};
pub use response_service::{DeletionReport, ResponseService};
pub use session_service::{SessionRecord, SessionRepository, SessionService};
pub use survey_export_service::{SurveyArchive, SurveyExportService};
pub use survey_ports::{AuditEvent, AuditRepository, ResponseRepository, SurveyRepository};
pub use user_service::{UserRepository, UserService};
