//! Error types for the docbind-core library.

use thiserror::Error;

use crate::models::document::DocumentType;

/// Main error type for the docbind library.
///
/// Every variant aborts the whole extraction call. Per-field failures are
/// reported through [`StrategyError`] instead and never surface here.
#[derive(Error, Debug)]
pub enum DocbindError {
    /// The document type cannot be handled.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// Decoding or reading the document failed.
    #[error("failed to normalize {doc_type} document: {message}")]
    Normalization {
        doc_type: DocumentType,
        message: String,
    },

    /// The batch binding reply could not be decoded.
    #[error("field binding failed: {0}")]
    Binding(String),

    /// Error from the inference layer.
    #[error("inference error: {0}")]
    Inference(#[from] docbind_inference::InferenceError),

    /// Malformed template.
    #[error("invalid template: {0}")]
    Template(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DocbindError {
    /// Wrap a failure that happened while normalizing a document.
    pub fn normalization(doc_type: DocumentType, message: impl std::fmt::Display) -> Self {
        Self::Normalization {
            doc_type,
            message: message.to_string(),
        }
    }
}

/// A single-field strategy could not run because its input is missing.
///
/// Non-fatal: the field gets an empty result and extraction continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    /// `regex` method without a pattern.
    #[error("no regex pattern configured")]
    MissingPattern,

    /// The configured pattern does not compile.
    #[error("invalid regex pattern: {0}")]
    InvalidPattern(String),

    /// `position` method without a rectangle.
    #[error("no position configured")]
    MissingPosition,

    /// The strategy needs an OCR result and none was supplied.
    #[error("no OCR result available")]
    MissingOcrResult,
}

/// Result type for the docbind library.
pub type Result<T> = std::result::Result<T, DocbindError>;
