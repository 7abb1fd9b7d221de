//! Document type detection from declared media type and file name.

use tracing::debug;

use crate::models::document::DocumentType;

const WORD_MEDIA_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/msword",
];

const EXCEL_MEDIA_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
];

/// Classify a document.
///
/// Resolution order: declared media type, then file extension, then the
/// short type tags (`pdf`, `word`, `excel`). Anything unresolved is treated
/// as an image; this never fails.
pub fn detect(media_type: &str, file_name: Option<&str>) -> DocumentType {
    let media_type = media_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    if let Some(doc_type) = from_media_type(&media_type) {
        return doc_type;
    }

    if let Some(doc_type) = file_name.and_then(from_file_name) {
        debug!("Detected {} from file name", doc_type);
        return doc_type;
    }

    match media_type.as_str() {
        "image" => DocumentType::Image,
        "pdf" => DocumentType::Pdf,
        "word" => DocumentType::Word,
        "excel" => DocumentType::Excel,
        _ => {
            debug!("Could not resolve document type for '{}', assuming image", media_type);
            DocumentType::Image
        }
    }
}

fn from_media_type(media_type: &str) -> Option<DocumentType> {
    if media_type.starts_with("image/") {
        Some(DocumentType::Image)
    } else if media_type == "application/pdf" {
        Some(DocumentType::Pdf)
    } else if WORD_MEDIA_TYPES.contains(&media_type) {
        Some(DocumentType::Word)
    } else if EXCEL_MEDIA_TYPES.contains(&media_type) {
        Some(DocumentType::Excel)
    } else {
        None
    }
}

fn from_file_name(file_name: &str) -> Option<DocumentType> {
    let extension = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" | "png" | "gif" | "bmp" | "webp" => Some(DocumentType::Image),
        "pdf" => Some(DocumentType::Pdf),
        "docx" | "doc" => Some(DocumentType::Word),
        "xlsx" | "xls" => Some(DocumentType::Excel),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_media_types() {
        assert_eq!(detect("image/png", None), DocumentType::Image);
        assert_eq!(detect("IMAGE/JPEG", None), DocumentType::Image);
        assert_eq!(detect("application/pdf", None), DocumentType::Pdf);
        assert_eq!(detect("application/msword", None), DocumentType::Word);
        assert_eq!(
            detect("application/vnd.openxmlformats-officedocument.wordprocessingml.document", None),
            DocumentType::Word
        );
        assert_eq!(detect("application/vnd.ms-excel", None), DocumentType::Excel);
        assert_eq!(
            detect("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet; charset=binary", None),
            DocumentType::Excel
        );
    }

    #[test]
    fn test_detect_file_name_fallback() {
        assert_eq!(detect("application/octet-stream", Some("scan.WEBP")), DocumentType::Image);
        assert_eq!(detect("", Some("contract.pdf")), DocumentType::Pdf);
        assert_eq!(detect("", Some("memo.doc")), DocumentType::Word);
        assert_eq!(detect("", Some("ledger.v2.xlsx")), DocumentType::Excel);
    }

    #[test]
    fn test_media_type_wins_over_file_name() {
        assert_eq!(detect("application/pdf", Some("sheet.xlsx")), DocumentType::Pdf);
    }

    #[test]
    fn test_detect_short_tags() {
        assert_eq!(detect("word", None), DocumentType::Word);
        assert_eq!(detect("excel", Some("noext")), DocumentType::Excel);
        assert_eq!(detect("pdf", None), DocumentType::Pdf);
    }

    #[test]
    fn test_unresolved_defaults_to_image() {
        assert_eq!(detect("", None), DocumentType::Image);
        assert_eq!(detect("text/plain", Some("notes.txt")), DocumentType::Image);
        assert_eq!(detect("application/zip", Some("archive")), DocumentType::Image);
    }
}
