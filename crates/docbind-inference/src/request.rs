//! Request types for the inference capability.

use serde::{Deserialize, Serialize};

/// Which model family a request is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelRole {
    /// Image-capable model used for document reading and per-field lookups.
    Vision,
    /// Text-only model used for batch field binding.
    Text,
}

/// An image attached to a request, carried as base64 text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    /// Media type used in the data URL (e.g. `image/png`).
    pub media_type: String,
    /// Base64-encoded bytes.
    pub base64: String,
}

impl ImagePayload {
    pub fn new(media_type: impl Into<String>, base64: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            base64: base64.into(),
        }
    }

    /// Render as a `data:` URL.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.base64)
    }
}

/// A single request to the inference capability.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceRequest {
    /// Target model family.
    pub role: ModelRole,
    /// Text instruction.
    pub prompt: String,
    /// Optional image the instruction refers to.
    pub image: Option<ImagePayload>,
    /// Ask the service to constrain its output to a JSON object.
    pub json_output: bool,
}

impl InferenceRequest {
    /// Create a vision request with an attached image.
    pub fn vision(image: ImagePayload, prompt: impl Into<String>) -> Self {
        Self {
            role: ModelRole::Vision,
            prompt: prompt.into(),
            image: Some(image),
            json_output: false,
        }
    }

    /// Create a text-only request.
    pub fn text(role: ModelRole, prompt: impl Into<String>) -> Self {
        Self {
            role,
            prompt: prompt.into(),
            image: None,
            json_output: false,
        }
    }

    /// Request a JSON object reply.
    pub fn with_json_output(mut self, json_output: bool) -> Self {
        self.json_output = json_output;
        self
    }
}
