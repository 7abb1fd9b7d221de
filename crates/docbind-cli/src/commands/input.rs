//! Loading of configuration, documents, templates and OCR results from disk.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use glob::glob;
use image::ImageFormat;
use tracing::{debug, info};

use docbind_core::document::sniff_media_type;
use docbind_core::{
    backend_from_config, detect, ChatCompletionsBackend, DocbindConfig, DocumentPayload,
    DocumentType, ExtractionPipeline, MemoryTemplateStore, OcrResult, Template, TemplateStore,
};

use super::word::docx_text;

/// Media types for office documents, by extension.
const OFFICE_MEDIA_TYPES: &[(&str, &str)] = &[
    ("docx", WORD_MEDIA_TYPE),
    ("doc", "application/msword"),
    ("xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    ("xls", "application/vnd.ms-excel"),
];

/// Media type sent for Word text, whether it came from a `.docx` or a text file.
const WORD_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Plain-text extensions, sent as already-extracted Word text.
const TEXT_EXTENSIONS: &[&str] = &["txt", "text", "md"];

/// Load configuration from `path`, or defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<DocbindConfig> {
    match path {
        Some(path) => Ok(DocbindConfig::from_file(Path::new(path))?),
        None => Ok(DocbindConfig::default()),
    }
}

/// Build a pipeline over the HTTP backend.
pub fn build_pipeline(
    config: &DocbindConfig,
) -> anyhow::Result<ExtractionPipeline<ChatCompletionsBackend>> {
    let backend = backend_from_config(&config.inference)?;
    Ok(ExtractionPipeline::new(backend).with_config(config.extraction.clone()))
}

/// Guess a media type from content, then from the file extension.
pub fn guess_media_type(bytes: &[u8], path: &Path) -> String {
    if let Some(media_type) = sniff_media_type(bytes) {
        return media_type.to_string();
    }

    if let Ok(format) = ImageFormat::from_path(path) {
        return format.to_mime_type().to_string();
    }

    let extension = extension(path);
    if TEXT_EXTENSIONS.contains(&extension.as_str()) {
        return WORD_MEDIA_TYPE.to_string();
    }

    OFFICE_MEDIA_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, media_type)| media_type.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

/// Read a document into a transport payload.
///
/// Word documents are sent as their extracted text; legacy `.doc` files are
/// rejected.
pub fn read_document(path: &Path, media_type: Option<&str>) -> anyhow::Result<DocumentPayload> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let mut bytes = fs::read(path)?;
    let media_type = media_type
        .map(str::to_string)
        .unwrap_or_else(|| guess_media_type(&bytes, path));
    let file_name = path.file_name().and_then(|n| n.to_str());
    debug!("{}: {} ({} bytes)", path.display(), media_type, bytes.len());

    if detect(&media_type, file_name) == DocumentType::Word {
        match extension(path).as_str() {
            "doc" => anyhow::bail!(
                "Legacy .doc files are not supported: {}; save it as .docx",
                path.display()
            ),
            "docx" => {
                bytes = docx_text(&bytes)
                    .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?
                    .into_bytes();
                debug!("Extracted {} bytes of text from {}", bytes.len(), path.display());
            }
            _ => {}
        }
    }

    let mut payload = DocumentPayload::new(media_type, STANDARD.encode(&bytes));
    if let Some(name) = file_name {
        payload = payload.with_file_name(name);
    }
    Ok(payload)
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Load a template from a file, or pick one from a directory of template files.
pub fn load_template(path: &Path, id: Option<&str>) -> anyhow::Result<Template> {
    if path.is_file() {
        return read_template(path);
    }
    if !path.is_dir() {
        anyhow::bail!("Template not found: {}", path.display());
    }

    let pattern = path.join("*.json");
    let files: Vec<PathBuf> = glob(&pattern.to_string_lossy())?
        .filter_map(|r| r.ok())
        .collect();

    let store = MemoryTemplateStore::new();
    for file in &files {
        store.put(read_template(file)?);
    }
    info!("Loaded {} templates from {}", store.len(), path.display());

    match id {
        Some(id) => store
            .get(id)
            .ok_or_else(|| anyhow::anyhow!("Template '{}' not found in {}", id, path.display())),
        None => {
            let mut templates = store.list();
            match templates.len() {
                0 => anyhow::bail!("No templates found in {}", path.display()),
                1 => Ok(templates.remove(0)),
                _ => {
                    let ids: Vec<String> = templates.into_iter().map(|t| t.id).collect();
                    anyhow::bail!(
                        "Several templates in {}; choose one with --template-id: {}",
                        path.display(),
                        ids.join(", ")
                    )
                }
            }
        }
    }
}

/// Parse one template file. A missing id falls back to the file stem.
pub fn read_template(path: &Path) -> anyhow::Result<Template> {
    let content = fs::read_to_string(path)?;
    let mut template: Template = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid template {}: {}", path.display(), e))?;

    if template.id.is_empty() {
        template.id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("template")
            .to_string();
    }
    Ok(template)
}

/// Load a word-level OCR result. Missing full text is rebuilt from the words.
pub fn load_ocr(path: &Path) -> anyhow::Result<OcrResult> {
    let content = fs::read_to_string(path)?;
    let ocr: OcrResult = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid OCR result {}: {}", path.display(), e))?;

    if ocr.text.is_empty() && !ocr.words.is_empty() {
        return Ok(OcrResult::from_words(ocr.words));
    }
    Ok(ocr)
}
