//! OpenAI-compatible chat-completions backend.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::InferenceError;
use crate::request::{InferenceRequest, ModelRole};
use crate::{InferenceBackend, Result};

/// Connection settings for [`ChatCompletionsBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Base URL, without the trailing `/chat/completions`.
    pub api_base: String,
    /// Bearer token.
    pub api_key: String,
    /// Model used for [`ModelRole::Vision`] requests.
    pub vision_model: String,
    /// Model used for [`ModelRole::Text`] requests.
    pub text_model: String,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Backend that talks to an OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionsBackend {
    http_client: Client,
    config: HttpBackendConfig,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionsBackend {
    /// Create a backend from explicit settings.
    pub fn new(config: HttpBackendConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(InferenceError::Config("API key is empty".to_string()));
        }
        Ok(Self {
            http_client: Client::new(),
            config,
        })
    }

    /// Get the backend settings.
    pub fn config(&self) -> &HttpBackendConfig {
        &self.config
    }

    fn model_for(&self, role: ModelRole) -> &str {
        match role {
            ModelRole::Vision => &self.config.vision_model,
            ModelRole::Text => &self.config.text_model,
        }
    }

    /// Build the JSON request body for a request.
    pub fn request_body(&self, request: &InferenceRequest) -> Value {
        let content = match &request.image {
            Some(image) => json!([
                { "type": "image_url", "image_url": { "url": image.data_url() } },
                { "type": "text", "text": request.prompt },
            ]),
            None => Value::String(request.prompt.clone()),
        };

        let mut body = json!({
            "model": self.model_for(request.role),
            "messages": [{ "role": "user", "content": content }],
            "temperature": self.config.temperature,
        });

        if request.json_output {
            body["response_format"] = json!({ "type": "json_object" });
        }

        body
    }
}

#[async_trait]
impl InferenceBackend for ChatCompletionsBackend {
    async fn complete(&self, request: &InferenceRequest) -> Result<String> {
        let model = self.model_for(request.role);
        debug!(
            model,
            prompt_len = request.prompt.len(),
            has_image = request.image.is_some(),
            "Sending chat completion request"
        );

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.config.api_base.trim_end_matches('/')))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&self.request_body(request))
            .send()
            .await
            .map_err(|e| InferenceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(model, status = status.as_u16(), "Chat completion request failed");
            return Err(InferenceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Network(format!("failed to read response: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(InferenceError::EmptyReply)?;

        debug!(model, reply_len = content.len(), "Received chat completion");
        Ok(content)
    }

    fn name(&self) -> &str {
        "chat-completions"
    }
}
