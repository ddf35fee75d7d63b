//! Survey interchange XML rendering.

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde_json::Value;

use surveyrpc_application::DocumentWriter;
use surveyrpc_core::{AppError, AppResult, SurveyId};
use surveyrpc_domain::{DataRow, DataTable, SurveyDocument};

/// Database schema version announced in every document.
pub const DOCUMENT_DB_VERSION: u32 = 366;

/// Renders survey documents with `quick-xml`.
///
/// Layout: `<document>` holding the document type, the schema version and one
/// element per table with its `<fields>` and `<rows>`. Values are written as
/// CDATA and `NULL` values are omitted from their row.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlDocumentWriter;

impl XmlDocumentWriter {
    /// Creates a writer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn write_error(error: impl std::fmt::Display) -> AppError {
    AppError::Internal(format!("failed to write survey document: {error}"))
}

fn start(writer: &mut XmlWriter, name: &str) -> AppResult<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(write_error)
}

fn end(writer: &mut XmlWriter, name: &str) -> AppResult<()> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(write_error)
}

fn text_element(writer: &mut XmlWriter, name: &str, text: &str) -> AppResult<()> {
    start(writer, name)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(write_error)?;
    end(writer, name)
}

fn cdata_element(writer: &mut XmlWriter, name: &str, text: &str) -> AppResult<()> {
    start(writer, name)?;
    for section in cdata_sections(text) {
        writer
            .write_event(Event::CData(BytesCData::new(section)))
            .map_err(write_error)?;
    }
    end(writer, name)
}

/// Splits text so that no section contains the CDATA terminator.
fn cdata_sections(text: &str) -> Vec<String> {
    let pieces: Vec<&str> = text.split("]]>").collect();
    let last = pieces.len().saturating_sub(1);

    pieces
        .iter()
        .enumerate()
        .map(|(index, piece)| {
            let mut section = String::with_capacity(piece.len() + 3);
            if index > 0 {
                section.push('>');
            }
            section.push_str(piece);
            if index < last {
                section.push_str("]]");
            }
            section
        })
        .collect()
}

/// Element names may not start with a digit, so such columns get a leading underscore.
fn element_name(column: &str) -> String {
    if column.starts_with(|character: char| character.is_ascii_digit()) {
        format!("_{column}")
    } else {
        column.to_owned()
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(flag) => Some(if *flag { "1" } else { "0" }.to_owned()),
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) => Some(text.clone()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

fn write_row(writer: &mut XmlWriter, columns: &[String], row: &DataRow) -> AppResult<()> {
    start(writer, "row")?;
    for column in columns {
        if let Some(text) = row.get(column).and_then(value_text) {
            cdata_element(writer, &element_name(column), &text)?;
        }
    }
    end(writer, "row")
}

fn write_table(writer: &mut XmlWriter, table: &DataTable) -> AppResult<()> {
    start(writer, &table.name)?;

    start(writer, "fields")?;
    for column in &table.columns {
        text_element(writer, "fieldname", &element_name(column))?;
    }
    end(writer, "fields")?;

    start(writer, "rows")?;
    for row in &table.rows {
        write_row(writer, &table.columns, row)?;
    }
    end(writer, "rows")?;

    end(writer, &table.name)
}

impl DocumentWriter for XmlDocumentWriter {
    fn write_document(
        &self,
        _survey_id: SurveyId,
        document: &SurveyDocument,
    ) -> AppResult<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(write_error)?;
        start(&mut writer, "document")?;
        text_element(
            &mut writer,
            "LimeSurveyDocType",
            document.document_type.as_str(),
        )?;
        text_element(&mut writer, "DBVersion", &DOCUMENT_DB_VERSION.to_string())?;
        for table in &document.tables {
            write_table(&mut writer, table)?;
        }
        end(&mut writer, "document")?;

        Ok(writer.into_inner().into_inner())
    }
}
