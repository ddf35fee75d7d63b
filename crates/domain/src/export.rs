use surveyrpc_core::SurveyId;

use crate::{DocumentType, SurveyPartition};

/// Entries that can appear in a survey archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportPart {
    /// Survey structure, always present.
    Structure,
    /// Response rows, present for active surveys.
    Responses,
    /// Token rows, present when the token partition exists.
    Tokens,
    /// Timing rows, present when the timings partition exists.
    Timings,
}

impl ExportPart {
    /// Returns the entry name inside the archive.
    #[must_use]
    pub fn archive_name(&self, survey_id: SurveyId) -> String {
        match self {
            Self::Structure => format!("survey_{survey_id}.lss"),
            Self::Responses => format!("survey_{survey_id}_responses.lsr"),
            Self::Tokens => format!("survey_{survey_id}_tokens.lst"),
            Self::Timings => format!("survey_{survey_id}_timings.lsi"),
        }
    }

    /// Returns the document type written for this part.
    #[must_use]
    pub fn document_type(&self) -> DocumentType {
        match self {
            Self::Structure => DocumentType::Survey,
            Self::Responses => DocumentType::Responses,
            Self::Tokens => DocumentType::Tokens,
            Self::Timings => DocumentType::Timings,
        }
    }

    /// Returns the partition backing an optional part.
    #[must_use]
    pub fn partition(&self) -> Option<SurveyPartition> {
        match self {
            Self::Structure => None,
            Self::Responses => Some(SurveyPartition::Responses),
            Self::Tokens => Some(SurveyPartition::Tokens),
            Self::Timings => Some(SurveyPartition::Timings),
        }
    }
}
