//! Core library for template-driven document field extraction.
//!
//! This crate provides:
//! - Document type detection and normalization (images, PDFs, Word text, spreadsheets)
//! - Per-field extraction strategies (model lookup, regex, fixed region, OCR keyword)
//! - Batch binding of a whole document onto a template in one model call
//! - Templates, ranked candidate results and the end-to-end pipeline

pub mod document;
pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod store;

#[cfg(feature = "http")]
mod backend;

pub use document::{detect, DocumentNormalizer};
pub use error::{DocbindError, Result, StrategyError};
pub use extract::{FieldBinder, TemplateEngine};
pub use models::config::{DocbindConfig, ExtractionConfig, ExtractionMode, InferenceConfig};
pub use models::document::{DocumentPayload, DocumentType, ParsedDocument, RawData, SheetData};
pub use models::region::{BoundingBox, Region};
pub use models::result::{Candidate, CandidateSource, ExtractionResult, Location};
pub use models::template::{ExtractionMethod, ExtractionSpec, Field, FieldType, Section, Template};
pub use ocr::{OcrResult, TextBox};
pub use pipeline::{ExtractionOutcome, ExtractionPipeline};
pub use store::{MemoryTemplateStore, TemplateStore};

#[cfg(feature = "http")]
pub use backend::{backend_from_config, http_settings};

/// Re-export inference types.
pub use docbind_inference::{InferenceBackend, InferenceError, InferenceRequest, ModelRole};

#[cfg(feature = "http")]
pub use docbind_inference::ChatCompletionsBackend;
