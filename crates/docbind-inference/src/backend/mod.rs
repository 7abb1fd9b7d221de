//! Inference backend implementations.

#[cfg(feature = "http")]
pub mod http;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{InferenceRequest, Result};

/// Trait for inference backends.
///
/// Submit an instruction (optionally with an image) and receive the model's
/// raw reply text.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Submit a request and return the raw reply content.
    async fn complete(&self, request: &InferenceRequest) -> Result<String>;

    /// Name of this backend (for diagnostics).
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: InferenceBackend + ?Sized> InferenceBackend for Arc<T> {
    async fn complete(&self, request: &InferenceRequest) -> Result<String> {
        (**self).complete(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
