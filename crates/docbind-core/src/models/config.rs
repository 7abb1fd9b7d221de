//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for docbind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocbindConfig {
    /// Inference service configuration.
    pub inference: InferenceConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Settings owned by the calling boundary.
    pub cli: CliConfig,
}

/// Inference service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Base URL of the OpenAI-compatible endpoint.
    pub api_base: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Environment variable that overrides `api_base` when set.
    pub api_base_env: String,

    /// Model used to read images and PDFs and for per-field lookups.
    pub vision_model: String,

    /// Model used for batch field binding.
    pub text_model: String,

    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_base: "https://dashscope.aliyuncs.com/compatible-mode/v1".to_string(),
            api_key_env: "QWEN_API_KEY".to_string(),
            api_base_env: "QWEN_API_BASE".to_string(),
            vision_model: "qwen-vl-max".to_string(),
            text_model: "qwen-plus".to_string(),
            temperature: 0.1,
        }
    }
}

/// How template fields are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// One binding call for all fields.
    #[default]
    Batch,
    /// Each field runs its own extraction method.
    PerField,
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Extraction mode.
    pub mode: ExtractionMode,

    /// Await per-field model calls concurrently.
    pub parallel_fields: bool,

    /// Lowest confidence assigned to a bound value in a long multi-value list.
    pub confidence_floor: f32,

    /// Confidence assumed for an OCR word that reports none.
    pub default_word_confidence: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::Batch,
            parallel_fields: false,
            confidence_floor: 0.05,
            default_word_confidence: 0.8,
        }
    }
}

/// Settings for the command-line front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Wall-clock budget for one extraction, in seconds.
    pub timeout_secs: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self { timeout_secs: 60 }
    }
}

impl DocbindConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
