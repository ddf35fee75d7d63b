use serde_json::{Map, Value};

/// One stored row keyed by column name.
pub type DataRow = Map<String, Value>;

/// Rows read from one storage table, with the table's column order.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    /// Element name used for the table inside a document, e.g. `responses`.
    pub name: String,
    /// Declared columns in storage order.
    pub columns: Vec<String>,
    /// Stored rows.
    pub rows: Vec<DataRow>,
}

impl DataTable {
    /// Creates a table snapshot.
    #[must_use]
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<DataRow>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }
}

/// Document kinds understood by the survey import tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentType {
    /// Survey structure (`.lss`).
    Survey,
    /// Response rows (`.lsr`).
    Responses,
    /// Participant tokens (`.lst`).
    Tokens,
    /// Response timings (`.lsi`).
    Timings,
}

impl DocumentType {
    /// Returns the value written into the document type element.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Survey => "Survey",
            Self::Responses => "Responses",
            Self::Tokens => "Tokens",
            Self::Timings => "Timings",
        }
    }
}

/// A typed set of tables serialised as one XML document.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyDocument {
    /// Document kind.
    pub document_type: DocumentType,
    /// Tables in output order.
    pub tables: Vec<DataTable>,
}

impl SurveyDocument {
    /// Creates a document.
    #[must_use]
    pub fn new(document_type: DocumentType, tables: Vec<DataTable>) -> Self {
        Self {
            document_type,
            tables,
        }
    }
}
