/// Outcome of a remote-control call: a value, or a user-facing status.
pub type RpcOutcome<T> = Result<T, RpcStatus>;

/// User-facing failures returned as ordinary RPC results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcStatus {
    /// Session key unknown or expired.
    InvalidSession,
    /// Survey id does not resolve to a survey.
    InvalidSurvey,
    /// CRUD verb is not one of create/read/update/delete/import/export.
    InvalidCrudVerb(String),
    /// Survey is not collecting responses.
    SurveyNotActive,
    /// Caller lacks the required permission.
    NoPermission,
    /// Survey response partition does not exist.
    NoResponseTable,
    /// Neither `id` nor `token` was supplied.
    MissingResponseIdentifier,
    /// No row matched the identifier.
    NoMatchingResponse,
    /// Several rows matched the identifier.
    MultipleMatchingResponses,
    /// Supplied field names outside the declared column set.
    InvalidColumns(Vec<String>),
    /// Storage rejected the modified row.
    UnableToEditResponse,
    /// At least one row or timing row of a batch failed to delete.
    DeletionFailed,
}

impl RpcStatus {
    /// Returns the message carried in the status payload.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::InvalidSession => "Invalid sessionkey".to_owned(),
            Self::InvalidSurvey => "Error: Invalid survey ID".to_owned(),
            Self::InvalidCrudVerb(verb) => format!("Error: Invalid permission verb '{verb}'"),
            Self::SurveyNotActive => "Error: Survey is not active.".to_owned(),
            Self::NoPermission => "No permission".to_owned(),
            Self::NoResponseTable => "Error: No survey response table".to_owned(),
            Self::MissingResponseIdentifier => {
                "Error: Missing response identifier (id|token).".to_owned()
            }
            Self::NoMatchingResponse => "Error: No matching Response.".to_owned(),
            Self::MultipleMatchingResponses => "Error: More than one matching response, \
                 updating multiple responses at once is not supported."
                .to_owned(),
            Self::InvalidColumns(names) => {
                format!("Error: Invalid Column names supplied: {}", names.join(", "))
            }
            Self::UnableToEditResponse => "Unable to edit response".to_owned(),
            Self::DeletionFailed => "Error: during response deletion".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RpcStatus;

    #[test]
    fn invalid_columns_message_lists_names() {
        let status = RpcStatus::InvalidColumns(vec!["score".to_owned(), "age".to_owned()]);
        assert_eq!(
            status.message(),
            "Error: Invalid Column names supplied: score, age"
        );
    }
}
