//! End-to-end extraction: detect, normalize, then fill the template.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use docbind_inference::InferenceBackend;

use crate::document::{detect, image_payload, DocumentNormalizer};
use crate::error::Result;
use crate::extract::TemplateEngine;
use crate::models::config::{ExtractionConfig, ExtractionMode};
use crate::models::document::{DocumentPayload, DocumentType, ParsedDocument};
use crate::models::result::ExtractionResult;
use crate::models::template::Template;
use crate::ocr::OcrResult;

/// Result of one extraction call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionOutcome {
    /// Detected document type.
    pub document_type: DocumentType,
    /// Per-field results keyed by field id.
    pub results: BTreeMap<String, ExtractionResult>,
    /// Normalized text, for display.
    pub raw_text: String,
    /// Fields whose strategy could not run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Extraction pipeline over an inference backend.
pub struct ExtractionPipeline<B: InferenceBackend> {
    backend: B,
    config: ExtractionConfig,
}

impl<B: InferenceBackend> ExtractionPipeline<B> {
    /// Create a pipeline with default settings.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            config: ExtractionConfig::default(),
        }
    }

    /// Set the extraction configuration.
    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the extraction mode.
    pub fn with_mode(mut self, mode: ExtractionMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Get the extraction configuration.
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Get the inference backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Detect and normalize a document without extracting fields.
    pub async fn normalize(&self, payload: &DocumentPayload) -> Result<ParsedDocument> {
        let doc_type = detect(&payload.media_type, payload.file_name.as_deref());
        DocumentNormalizer::new(&self.backend)
            .normalize(doc_type, &payload.content, payload.file_name.as_deref())
            .await
    }

    /// Extract `template` from `payload`.
    pub async fn extract(
        &self,
        template: &Template,
        payload: &DocumentPayload,
    ) -> Result<ExtractionOutcome> {
        self.extract_with_ocr(template, payload, None).await
    }

    /// Extract `template` from `payload`, giving the per-field strategies
    /// access to a word-level OCR result.
    pub async fn extract_with_ocr(
        &self,
        template: &Template,
        payload: &DocumentPayload,
        ocr: Option<&OcrResult>,
    ) -> Result<ExtractionOutcome> {
        let start = Instant::now();

        let document = self.normalize(payload).await?;
        let image = document
            .doc_type
            .is_visual()
            .then(|| image_payload(document.doc_type, &payload.content));

        let fields = TemplateEngine::new(&self.backend)
            .with_config(self.config.clone())
            .extract(template, &document, image.as_ref(), ocr)
            .await?;

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Extracted {} fields from {} document in {}ms",
            fields.results.len(),
            document.doc_type,
            processing_time_ms
        );

        Ok(ExtractionOutcome {
            document_type: document.doc_type,
            results: fields.results,
            raw_text: document.raw_text(),
            warnings: fields.warnings,
            processing_time_ms,
        })
    }
}
