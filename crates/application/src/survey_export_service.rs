use std::sync::Arc;

use surveyrpc_core::{AppResult, CallContext, SurveyId};
use surveyrpc_domain::{
    AuditAction, DocumentType, ExportPart, RpcOutcome, RpcStatus, SurveyDocument,
};
use tracing::info;

use crate::export_ports::{ArchiveBuilder, ArchiveWriter, DocumentWriter};
use crate::{AuditEvent, AuditRepository, ResponseRepository, SurveyRepository};

/// Parts that are only included when their backing data exists.
const OPTIONAL_PARTS: [ExportPart; 3] = [
    ExportPart::Responses,
    ExportPart::Tokens,
    ExportPart::Timings,
];

/// Finished survey archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyArchive {
    /// Entry names in the order they were added.
    pub entries: Vec<String>,
    /// ZIP bytes.
    pub bytes: Vec<u8>,
}

/// Application service packaging a survey and its partitions into one archive.
#[derive(Clone)]
pub struct SurveyExportService {
    survey_repository: Arc<dyn SurveyRepository>,
    response_repository: Arc<dyn ResponseRepository>,
    document_writer: Arc<dyn DocumentWriter>,
    archive_builder: Arc<dyn ArchiveBuilder>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl SurveyExportService {
    /// Creates a new export service.
    #[must_use]
    pub fn new(
        survey_repository: Arc<dyn SurveyRepository>,
        response_repository: Arc<dyn ResponseRepository>,
        document_writer: Arc<dyn DocumentWriter>,
        archive_builder: Arc<dyn ArchiveBuilder>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            survey_repository,
            response_repository,
            document_writer,
            archive_builder,
            audit_repository,
        }
    }

    /// Exports structure, responses, tokens and timings of a survey.
    ///
    /// The structure document is always present. Responses are included for
    /// active surveys, tokens and timings whenever their partition exists.
    pub async fn export_survey(
        &self,
        context: &CallContext,
        survey_id: SurveyId,
    ) -> AppResult<RpcOutcome<SurveyArchive>> {
        let Some(survey) = self.survey_repository.find_survey(survey_id).await? else {
            return Ok(Err(RpcStatus::InvalidSurvey));
        };

        let mut archive = self.archive_builder.create()?;
        let mut entries = Vec::new();

        let structure = SurveyDocument::new(
            DocumentType::Survey,
            self.survey_repository.load_structure(survey_id).await?,
        );
        entries.push(self.add_part(
            archive.as_mut(),
            survey_id,
            ExportPart::Structure,
            &structure,
        )?);

        for part in OPTIONAL_PARTS {
            if part == ExportPart::Responses && !survey.is_active() {
                continue;
            }
            let Some(partition) = part.partition() else {
                continue;
            };
            let Some(table) = self
                .response_repository
                .read_partition(survey_id, partition)
                .await?
            else {
                continue;
            };

            let document = SurveyDocument::new(part.document_type(), vec![table]);
            entries.push(self.add_part(archive.as_mut(), survey_id, part, &document)?);
        }

        let bytes = archive.finish()?;

        self.audit_repository
            .append_event(AuditEvent {
                user_id: context.user_id(),
                action: AuditAction::SurveyExported,
                survey_id,
                resource_id: survey_id.to_string(),
                detail: Some(format!("exported entries: {}", entries.join(", "))),
            })
            .await?;

        info!(%survey_id, entries = entries.len(), bytes = bytes.len(), "survey archive exported");

        Ok(Ok(SurveyArchive { entries, bytes }))
    }

    fn add_part(
        &self,
        archive: &mut dyn ArchiveWriter,
        survey_id: SurveyId,
        part: ExportPart,
        document: &SurveyDocument,
    ) -> AppResult<String> {
        let entry_name = part.archive_name(survey_id);
        let content = self.document_writer.write_document(survey_id, document)?;
        archive.add_part(entry_name.as_str(), &content)?;
        Ok(entry_name)
    }
}
