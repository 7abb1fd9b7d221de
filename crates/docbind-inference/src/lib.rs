//! Vision/language inference capability for docbind.
//!
//! This crate defines the narrow contract the extraction core consumes:
//! - [`InferenceRequest`]: a text instruction, optionally with an image
//! - [`InferenceBackend`]: anything that can answer such a request
//! - [`VisionReply`]: the tolerant reading of a free-text or JSON reply
//!
//! The `http` feature adds [`ChatCompletionsBackend`], which talks to any
//! OpenAI-compatible `/chat/completions` endpoint.

mod backend;
mod error;
mod reply;
mod request;

pub use backend::InferenceBackend;
pub use error::InferenceError;
pub use reply::{ReplyCandidate, VisionReply, DEFAULT_JSON_CONFIDENCE, DEFAULT_TEXT_CONFIDENCE};
pub use request::{ImagePayload, InferenceRequest, ModelRole};

#[cfg(feature = "http")]
pub use backend::http::{ChatCompletionsBackend, HttpBackendConfig};

/// Result type for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;
