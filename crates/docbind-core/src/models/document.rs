//! Document payloads and their normalized form.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The four document families the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Image,
    Pdf,
    Word,
    Excel,
}

impl DocumentType {
    /// Image and PDF documents are read by the vision model.
    pub fn is_visual(&self) -> bool {
        matches!(self, DocumentType::Image | DocumentType::Pdf)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Image => "image",
            DocumentType::Pdf => "pdf",
            DocumentType::Word => "word",
            DocumentType::Excel => "excel",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document as submitted for extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPayload {
    /// Declared media type, or one of the short tags `image`/`pdf`/`word`/`excel`.
    pub media_type: String,
    /// Base64 transport encoding of the document bytes (or, for Word,
    /// of the already-extracted text).
    pub content: String,
    /// Original file name, used when the media type is inconclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl DocumentPayload {
    pub fn new(media_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            content: content.into(),
            file_name: None,
        }
    }

    /// Set the file name.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

/// Raw normalized content: decoded text or an opaque structured payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawData {
    Text(String),
    Structured(Value),
}

impl RawData {
    /// Render as text. Structured payloads are serialized as JSON.
    pub fn to_text(&self) -> String {
        match self {
            RawData::Text(text) => text.clone(),
            RawData::Structured(value) => value.to_string(),
        }
    }
}

/// One spreadsheet sheet as a rectangular grid of cell strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetData {
    pub sheet_name: String,
    pub data: Vec<Vec<String>>,
}

/// Canonical representation of a document, produced once per extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDocument {
    #[serde(rename = "type")]
    pub doc_type: DocumentType,

    pub raw_data: RawData,

    /// Richer tabular structure, when the source has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_data: Option<Vec<SheetData>>,
}

impl ParsedDocument {
    /// A document whose content is plain text.
    pub fn text(doc_type: DocumentType, text: impl Into<String>) -> Self {
        Self {
            doc_type,
            raw_data: RawData::Text(text.into()),
            structured_data: None,
        }
    }

    /// The raw content as text.
    pub fn raw_text(&self) -> String {
        self.raw_data.to_text()
    }

    /// Content handed to the binder: structured data (pretty JSON) when
    /// present, raw text otherwise.
    pub fn binding_content(&self) -> String {
        match &self.structured_data {
            Some(sheets) => {
                serde_json::to_string_pretty(sheets).unwrap_or_else(|_| self.raw_text())
            }
            None => self.raw_text(),
        }
    }
}
