//! Error types for the inference layer.

use thiserror::Error;

/// Errors that can occur while talking to the inference capability.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// Missing credentials or invalid backend settings.
    #[error("configuration error: {0}")]
    Config(String),

    /// The request could not be delivered (connection, TLS, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The service answered without any message content.
    #[error("empty reply from inference service")]
    EmptyReply,
}
