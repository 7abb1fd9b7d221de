//! Field extraction.
//!
//! Two paths fill a template:
//! - per field: each field runs the strategy its extraction method names
//!   ([`rules`] for the local ones, [`AiStrategy`] for model lookups)
//! - batch: [`FieldBinder`] maps the whole document onto every field in
//!   one model call
//!
//! [`TemplateEngine`] dispatches between them.

mod ai;
mod binder;
mod engine;
pub mod prompts;
pub mod rules;

pub use ai::AiStrategy;
pub use binder::{find_balanced_object, parse_binding, shape_candidates, FieldBinder};
pub use engine::{FieldResults, TemplateEngine};

use serde_json::Value;

use crate::error::StrategyError;
use crate::models::result::ExtractionResult;
use crate::models::template::Field;
use crate::ocr::OcrResult;

/// Result type for single-field strategies.
pub type StrategyResult = std::result::Result<ExtractionResult, StrategyError>;

/// What a local strategy can look at.
#[derive(Debug, Clone, Copy)]
pub struct StrategyInput<'a> {
    /// Normalized document text.
    pub text: &'a str,
    /// Word-level OCR output, when the caller supplied one.
    pub ocr: Option<&'a OcrResult>,
}

impl<'a> StrategyInput<'a> {
    pub fn new(text: &'a str, ocr: Option<&'a OcrResult>) -> Self {
        Self { text, ocr }
    }

    /// OCR full text when available, the normalized text otherwise.
    pub fn full_text(&self) -> &'a str {
        match self.ocr {
            Some(ocr) if !ocr.text.is_empty() => &ocr.text,
            _ => self.text,
        }
    }

    /// The OCR result, or the error a strategy that needs one reports.
    pub fn require_ocr(&self) -> std::result::Result<&'a OcrResult, StrategyError> {
        self.ocr.ok_or(StrategyError::MissingOcrResult)
    }
}

/// A synchronous single-field strategy.
pub trait FieldStrategy {
    /// Produce ranked candidates for `field`.
    fn extract(&self, field: &Field, input: &StrategyInput<'_>) -> StrategyResult;
}

/// Render a model-supplied JSON value as a field value.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}
