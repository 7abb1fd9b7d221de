//! Conversion of each document type into a [`ParsedDocument`].

use tracing::{debug, info};

use docbind_inference::{ImagePayload, InferenceBackend, InferenceRequest, VisionReply};

use super::spreadsheet::{read_workbook, render_sheets};
use super::transport::{decode_base64, sniff_media_type, split_data_url};
use crate::error::{DocbindError, Result};
use crate::models::document::{DocumentType, ParsedDocument, RawData};

/// Instruction used to read an image or PDF in full.
pub const READ_DOCUMENT_PROMPT: &str = "请仔细分析这个{kind}，提取其中的所有文本内容和结构化信息。

要求：
1. 提取所有可见的文本内容
2. 识别表格、列表等结构化数据
3. 保留文本的层次结构和格式信息
4. 如果有多页，请按页组织内容

请以结构化的方式返回提取的内容，包括：
- 所有文本内容
- 表格数据（如果有）
- 关键信息点

返回格式：纯文本，清晰描述文档内容。";

/// Zip container (docx) and OLE compound file (doc) signatures.
const WORD_CONTAINER_MAGIC: &[&[u8]] = &[b"PK\x03\x04", &[0xD0, 0xCF, 0x11, 0xE0]];

/// Normalizes documents, delegating images and PDFs to the vision model.
pub struct DocumentNormalizer<'a, B: InferenceBackend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: InferenceBackend + ?Sized> DocumentNormalizer<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Normalize `content` (base64 transport text) of the given type.
    pub async fn normalize(
        &self,
        doc_type: DocumentType,
        content: &str,
        file_name: Option<&str>,
    ) -> Result<ParsedDocument> {
        info!(
            "Normalizing {} document ({} bytes of transport content{})",
            doc_type,
            content.len(),
            file_name.map(|n| format!(", file {n}")).unwrap_or_default()
        );

        match doc_type {
            DocumentType::Image | DocumentType::Pdf => self.read_visual(doc_type, content).await,
            DocumentType::Word => normalize_word(content),
            DocumentType::Excel => normalize_excel(content),
        }
    }

    async fn read_visual(&self, doc_type: DocumentType, content: &str) -> Result<ParsedDocument> {
        let image = image_payload(doc_type, content);
        let kind = if doc_type == DocumentType::Pdf { "PDF文档" } else { "图片" };
        let request = InferenceRequest::vision(image, READ_DOCUMENT_PROMPT.replace("{kind}", kind));

        let reply = self
            .backend
            .complete(&request)
            .await
            .map_err(|e| DocbindError::normalization(doc_type, e))?;

        let reply = VisionReply::parse(&reply);
        let raw_data = match reply.value {
            serde_json::Value::String(text) => RawData::Text(text),
            other => RawData::Structured(other),
        };

        debug!("Vision model returned {} characters", raw_data.to_text().len());
        Ok(ParsedDocument {
            doc_type,
            raw_data,
            structured_data: None,
        })
    }
}

/// Build the image attachment for a visual document. The media type comes
/// from a data-URL prefix, then from magic bytes, then from the type.
pub fn image_payload(doc_type: DocumentType, content: &str) -> ImagePayload {
    let (declared, body) = split_data_url(content);
    let media_type = declared
        .map(str::to_string)
        .or_else(|| {
            decode_base64(body)
                .ok()
                .and_then(|bytes| sniff_media_type(&bytes))
                .map(str::to_string)
        })
        .unwrap_or_else(|| match doc_type {
            DocumentType::Pdf => "application/pdf".to_string(),
            _ => "image/jpeg".to_string(),
        });
    ImagePayload::new(media_type, body.trim())
}

/// Normalize a Word document whose text was extracted upstream and sent as
/// base64. Content that is not base64 is taken as already-decoded text.
pub fn normalize_word(content: &str) -> Result<ParsedDocument> {
    let text = match decode_base64(content) {
        Ok(bytes) => {
            if WORD_CONTAINER_MAGIC.iter().any(|magic| bytes.starts_with(magic)) {
                return Err(DocbindError::UnsupportedFormat(
                    "binary Word containers are not parsed; submit the extracted text".to_string(),
                ));
            }
            match String::from_utf8(bytes) {
                Ok(text) => clean_control_chars(&text),
                // Base64-alphabet text that happens to decode to non-UTF-8 bytes.
                Err(_) => content.to_string(),
            }
        }
        Err(_) => content.to_string(),
    };

    Ok(ParsedDocument::text(DocumentType::Word, text))
}

/// Normalize a spreadsheet sent as base64 bytes.
pub fn normalize_excel(content: &str) -> Result<ParsedDocument> {
    let bytes =
        decode_base64(content).map_err(|e| DocbindError::normalization(DocumentType::Excel, e))?;
    let sheets =
        read_workbook(&bytes).map_err(|e| DocbindError::normalization(DocumentType::Excel, e))?;

    debug!("Read {} sheets from workbook", sheets.len());
    Ok(ParsedDocument {
        doc_type: DocumentType::Excel,
        raw_data: RawData::Text(render_sheets(&sheets)),
        structured_data: Some(sheets),
    })
}

/// Page and line-tabulation breaks become newlines; other control
/// characters are dropped.
fn clean_control_chars(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\n' | '\r' | '\t' => Some(c),
            '\x0b' | '\x0c' => Some('\n'),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}
