//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_survey_store;
mod postgres_audit_repository;
mod postgres_dynamic_tables;
mod postgres_permission_repository;
mod postgres_response_repository;
mod postgres_session_repository;
mod postgres_survey_repository;
mod postgres_user_repository;
mod tracing_response_observer;
mod xml_document_writer;
mod zip_archive_builder;

pub use in_memory_survey_store::InMemorySurveyStore;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_dynamic_tables::PartitionNames;
pub use postgres_permission_repository::PostgresPermissionRepository;
pub use postgres_response_repository::PostgresResponseRepository;
pub use postgres_session_repository::PostgresSessionRepository;
pub use postgres_survey_repository::PostgresSurveyRepository;
pub use postgres_user_repository::PostgresUserRepository;
pub use tracing_response_observer::TracingResponseObserver;
pub use xml_document_writer::{DOCUMENT_DB_VERSION, XmlDocumentWriter};
pub use zip_archive_builder::ZipArchiveBuilder;
