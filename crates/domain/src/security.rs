use std::str::FromStr;

use serde::{Deserialize, Serialize};
use surveyrpc_core::{AppError, SurveyId};

/// Global permission that implies every other permission.
pub const SUPERADMIN_PERMISSION: &str = "superadmin";

/// Survey permission guarding response rows.
pub const RESPONSES_PERMISSION: &str = "responses";

/// CRUD verb qualifying a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrudVerb {
    /// Create new rows.
    Create,
    /// Read existing rows.
    Read,
    /// Modify existing rows.
    Update,
    /// Remove rows.
    Delete,
    /// Import data.
    Import,
    /// Export data.
    Export,
}

impl CrudVerb {
    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Import => "import",
            Self::Export => "export",
        }
    }

    /// Parses a transport value into a verb.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for CrudVerb {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "create" => Ok(Self::Create),
            "read" => Ok(Self::Read),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "import" => Ok(Self::Import),
            "export" => Ok(Self::Export),
            _ => Err(AppError::Validation(format!("unknown CRUD verb '{value}'"))),
        }
    }
}

/// Scope a permission grant applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionScope {
    /// Installation-wide permission.
    Global,
    /// Permission on a single survey.
    Survey(SurveyId),
}

impl PermissionScope {
    /// Returns the storage entity label.
    #[must_use]
    pub fn entity(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Survey(_) => "survey",
        }
    }

    /// Returns the storage entity id (`0` for global grants).
    #[must_use]
    pub fn entity_id(&self) -> i64 {
        match self {
            Self::Global => 0,
            Self::Survey(survey_id) => survey_id.value(),
        }
    }
}

/// CRUD flags stored on one grant row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrudFlags {
    /// Create flag.
    pub create: bool,
    /// Read flag.
    pub read: bool,
    /// Update flag.
    pub update: bool,
    /// Delete flag.
    pub delete: bool,
    /// Import flag.
    pub import: bool,
    /// Export flag.
    pub export: bool,
}

impl CrudFlags {
    /// Flags with every verb granted.
    #[must_use]
    pub fn all() -> Self {
        Self {
            create: true,
            read: true,
            update: true,
            delete: true,
            import: true,
            export: true,
        }
    }

    /// Returns whether the verb is granted.
    #[must_use]
    pub fn allows(&self, verb: CrudVerb) -> bool {
        match verb {
            CrudVerb::Create => self.create,
            CrudVerb::Read => self.read,
            CrudVerb::Update => self.update,
            CrudVerb::Delete => self.delete,
            CrudVerb::Import => self.import,
            CrudVerb::Export => self.export,
        }
    }
}

/// One stored permission row for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// Scope of the grant.
    pub scope: PermissionScope,
    /// Permission name, e.g. `responses` or `surveys`.
    pub permission: String,
    /// Granted verbs.
    pub flags: CrudFlags,
}

impl PermissionGrant {
    /// Returns whether this grant answers `permission`/`verb` positively.
    #[must_use]
    pub fn grants(&self, permission: &str, verb: CrudVerb) -> bool {
        self.permission == permission && self.flags.allows(verb)
    }
}

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a response row is updated through the RPC surface.
    ResponseUpdated,
    /// Emitted when a response row is deleted through the RPC surface.
    ResponseDeleted,
    /// Emitted when a survey archive is exported.
    SurveyExported,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResponseUpdated => "response.updated",
            Self::ResponseDeleted => "response.deleted",
            Self::SurveyExported => "survey.exported",
        }
    }
}
