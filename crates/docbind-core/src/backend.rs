//! Construction of the HTTP inference backend from configuration.

use docbind_inference::{ChatCompletionsBackend, HttpBackendConfig};

use crate::error::{DocbindError, Result};
use crate::models::config::InferenceConfig;

/// Create the chat-completions backend, reading credentials from the
/// environment variables named in `config`.
pub fn backend_from_config(config: &InferenceConfig) -> Result<ChatCompletionsBackend> {
    let settings = http_settings(config, |name| std::env::var(name).ok())?;
    Ok(ChatCompletionsBackend::new(settings)?)
}

/// Resolve backend settings using `lookup` for environment variables.
pub fn http_settings(
    config: &InferenceConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<HttpBackendConfig> {
    let api_key = lookup(&config.api_key_env)
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            DocbindError::Config(format!(
                "API key not set; export {} to enable model calls",
                config.api_key_env
            ))
        })?;

    let api_base = lookup(&config.api_base_env)
        .filter(|base| !base.trim().is_empty())
        .unwrap_or_else(|| config.api_base.clone());

    Ok(HttpBackendConfig {
        api_base: api_base.trim_end_matches('/').to_string(),
        api_key,
        vision_model: config.vision_model.clone(),
        text_model: config.text_model.clone(),
        temperature: config.temperature,
    })
}
