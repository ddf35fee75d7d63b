//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod document;
mod export;
mod response;
mod security;
mod status;
mod survey;
mod transport;
mod user;

pub use document::{DataRow, DataTable, DocumentType, SurveyDocument};
pub use export::ExportPart;
pub use response::{
    InvalidColumns, ResponseColumns, ResponseId, ResponseIdentifier, ResponseRecord,
    ResponseUpdate,
};
pub use security::{
    AuditAction, CrudFlags, CrudVerb, PermissionGrant, PermissionScope, RESPONSES_PERMISSION,
    SUPERADMIN_PERMISSION,
};
pub use status::{RpcOutcome, RpcStatus};
pub use survey::{Survey, SurveyPartition};
pub use transport::integer_cast;
pub use user::{User, UserProfile};
