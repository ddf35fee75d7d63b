use surveyrpc_core::{AppResult, SurveyId};
use surveyrpc_domain::SurveyDocument;

/// Serialises survey documents into the XML interchange format.
pub trait DocumentWriter: Send + Sync {
    /// Renders one document for the given survey.
    fn write_document(&self, survey_id: SurveyId, document: &SurveyDocument)
    -> AppResult<Vec<u8>>;
}

/// Creates archives that collect exported parts.
pub trait ArchiveBuilder: Send + Sync {
    /// Starts a new empty archive.
    fn create(&self) -> AppResult<Box<dyn ArchiveWriter>>;
}

/// An archive being assembled.
pub trait ArchiveWriter: Send {
    /// Stages `content` in a private temporary file, adds it under
    /// `entry_name` and removes the temporary file before returning.
    fn add_part(&mut self, entry_name: &str, content: &[u8]) -> AppResult<()>;

    /// Finalises the archive and returns its bytes.
    fn finish(self: Box<Self>) -> AppResult<Vec<u8>>;
}
