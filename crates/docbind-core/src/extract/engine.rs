//! Template engine: fills every field of a template from a parsed document.

use std::collections::BTreeMap;

use futures_util::future::join_all;
use tracing::{debug, info, warn};

use docbind_inference::{ImagePayload, InferenceBackend};

use super::ai::AiStrategy;
use super::binder::{shape_candidates, FieldBinder};
use super::rules::{KeywordStrategy, PositionStrategy, RegexStrategy};
use super::{FieldStrategy, StrategyInput, StrategyResult};
use crate::error::Result;
use crate::models::config::{ExtractionConfig, ExtractionMode};
use crate::models::document::ParsedDocument;
use crate::models::result::{CandidateSource, ExtractionResult};
use crate::models::template::{ExtractionMethod, Field, Template};
use crate::ocr::OcrResult;

/// Results for all fields of a template, keyed by field id.
#[derive(Debug, Clone, Default)]
pub struct FieldResults {
    pub results: BTreeMap<String, ExtractionResult>,
    /// One entry per field whose strategy could not run.
    pub warnings: Vec<String>,
}

/// Runs a template against a parsed document.
pub struct TemplateEngine<'a, B: InferenceBackend + ?Sized> {
    backend: &'a B,
    config: ExtractionConfig,
}

impl<'a, B: InferenceBackend + ?Sized> TemplateEngine<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            config: ExtractionConfig::default(),
        }
    }

    /// Set the extraction configuration.
    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    /// Extract every field using the configured mode.
    pub async fn extract(
        &self,
        template: &Template,
        document: &ParsedDocument,
        image: Option<&ImagePayload>,
        ocr: Option<&OcrResult>,
    ) -> Result<FieldResults> {
        match self.config.mode {
            ExtractionMode::Batch => self.extract_batch(template, document).await,
            ExtractionMode::PerField => self.extract_per_field(template, document, image, ocr).await,
        }
    }

    /// Bind all fields with one model call.
    pub async fn extract_batch(
        &self,
        template: &Template,
        document: &ParsedDocument,
    ) -> Result<FieldResults> {
        let fields: Vec<&Field> = template.fields().collect();
        if fields.is_empty() {
            return Ok(FieldResults::default());
        }

        let bound = FieldBinder::new(self.backend)
            .bind(&document.binding_content(), &fields)
            .await?;

        let source = if document.doc_type.is_visual() {
            CandidateSource::Ai
        } else {
            CandidateSource::Direct
        };

        let results = fields
            .iter()
            .map(|field| {
                let value = bound.get(&field.name).map(String::as_str).unwrap_or_default();
                let result = shape_candidates(field, value, source, self.config.confidence_floor);
                (field.id.clone(), result)
            })
            .collect();

        Ok(FieldResults {
            results,
            warnings: Vec::new(),
        })
    }

    /// Run each field's own extraction method.
    ///
    /// A field whose strategy cannot run gets an empty result and a warning;
    /// the other fields are unaffected. Model failures abort the call.
    pub async fn extract_per_field(
        &self,
        template: &Template,
        document: &ParsedDocument,
        image: Option<&ImagePayload>,
        ocr: Option<&OcrResult>,
    ) -> Result<FieldResults> {
        let text = document.raw_text();
        let input = StrategyInput::new(&text, ocr);

        let outcomes = if self.config.parallel_fields {
            join_all(template.fields().map(|field| self.extract_field(field, &input, image))).await
        } else {
            let mut outcomes = Vec::with_capacity(template.field_count());
            for field in template.fields() {
                outcomes.push(self.extract_field(field, &input, image).await);
            }
            outcomes
        };

        let mut output = FieldResults::default();
        for (field, outcome) in template.fields().zip(outcomes) {
            let result = match outcome? {
                Ok(result) => result,
                Err(e) => {
                    warn!("Field '{}' skipped: {}", field.name, e);
                    output.warnings.push(format!("{}: {}", field.name, e));
                    ExtractionResult::empty(field)
                }
            };
            output.results.insert(field.id.clone(), result);
        }

        info!(
            "Extracted {} fields ({} warnings)",
            output.results.len(),
            output.warnings.len()
        );
        Ok(output)
    }

    /// Extract one field. The outer error is fatal, the inner one only
    /// affects this field.
    pub async fn extract_field(
        &self,
        field: &Field,
        input: &StrategyInput<'_>,
        image: Option<&ImagePayload>,
    ) -> Result<StrategyResult> {
        debug!("Extracting field '{}' via {}", field.name, field.extraction.method.name());

        let outcome = match &field.extraction.method {
            ExtractionMethod::Ai | ExtractionMethod::Hybrid => {
                let result = AiStrategy::new(self.backend)
                    .extract(field, image, input.text)
                    .await?;
                Ok(result)
            }
            ExtractionMethod::Regex { pattern } => {
                RegexStrategy::new(pattern).and_then(|strategy| strategy.extract(field, input))
            }
            ExtractionMethod::Position { region } => PositionStrategy::new(*region)
                .with_default_word_confidence(self.config.default_word_confidence)
                .extract(field, input),
            ExtractionMethod::Ocr => KeywordStrategy::new().extract(field, input),
            ExtractionMethod::Misconfigured { error, .. } => Err(error.clone()),
            ExtractionMethod::Unknown { method } => {
                debug!("Unknown extraction method '{}' for field '{}'", method, field.name);
                Ok(ExtractionResult::empty(field))
            }
        };

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StrategyError;
    use crate::models::document::DocumentType;
    use crate::models::region::{BoundingBox, Region};
    use crate::models::template::Section;
    use async_trait::async_trait;
    use docbind_inference::{InferenceError, InferenceRequest};
    use std::sync::Mutex;

    /// Backend that returns queued replies in order.
    struct QueueBackend {
        replies: Mutex<Vec<String>>,
        calls: Mutex<usize>,
    }

    impl QueueBackend {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().rev().map(|r| r.to_string()).collect()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl InferenceBackend for QueueBackend {
        async fn complete(&self, _request: &InferenceRequest) -> docbind_inference::Result<String> {
            *self.calls.lock().unwrap() += 1;
            self.replies
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| InferenceError::Network("no scripted reply".to_string()))
        }

        fn name(&self) -> &str {
            "queue"
        }
    }

    fn template(fields: Vec<Field>) -> Template {
        let section = fields
            .into_iter()
            .fold(Section::new("s1", "Main"), Section::with_field);
        Template::new("t1", "Test").with_section(section)
    }

    #[tokio::test]
    async fn test_batch_uses_one_call() {
        let backend = QueueBackend::new(&[r#"{"Name": "Ann", "Age": "30"}"#]);
        let template = template(vec![
            Field::new("f1", "Name", ExtractionMethod::Ai),
            Field::new("f2", "Age", ExtractionMethod::Regex { pattern: r"\d+".to_string() }),
        ]);
        let document = ParsedDocument::text(DocumentType::Word, "Name: Ann, Age: 30");

        let output = TemplateEngine::new(&backend)
            .extract(&template, &document, None, None)
            .await
            .unwrap();

        assert_eq!(backend.calls(), 1);
        assert_eq!(output.results["f1"].selected_values, ["Ann"]);
        assert_eq!(output.results["f2"].candidates[0].source, CandidateSource::Direct);
    }

    #[tokio::test]
    async fn test_batch_source_for_visual_documents() {
        let backend = QueueBackend::new(&[r#"{"Name": "Ann"}"#]);
        let template = template(vec![Field::new("f1", "Name", ExtractionMethod::Ai)]);
        let document = ParsedDocument::text(DocumentType::Image, "Name: Ann");

        let output = TemplateEngine::new(&backend)
            .extract_batch(&template, &document)
            .await
            .unwrap();
        assert_eq!(output.results["f1"].candidates[0].source, CandidateSource::Ai);
    }

    #[tokio::test]
    async fn test_per_field_isolates_strategy_errors() {
        let backend = QueueBackend::new(&[]);
        let region = Region::new(1, BoundingBox::new(0.0, 0.0, 10.0, 10.0));
        let template = template(vec![
            Field::new("f1", "Invoice No", ExtractionMethod::Regex { pattern: r"INV-(\d+)".to_string() }),
            Field::new("f2", "Total", ExtractionMethod::Position { region }),
            Field::new(
                "f3",
                "Broken",
                ExtractionMethod::Misconfigured {
                    method: "regex".to_string(),
                    error: StrategyError::MissingPattern,
                },
            ),
            Field::new("f4", "Other", ExtractionMethod::Unknown { method: "magic".to_string() }),
        ]);
        let document = ParsedDocument::text(DocumentType::Word, "Ref: INV-4821");
        let config = ExtractionConfig {
            mode: ExtractionMode::PerField,
            ..Default::default()
        };

        let output = TemplateEngine::new(&backend)
            .with_config(config)
            .extract(&template, &document, None, None)
            .await
            .unwrap();

        assert_eq!(backend.calls(), 0);
        assert_eq!(output.results.len(), 4);
        assert_eq!(output.results["f1"].selected_values, ["4821"]);
        assert!(output.results["f2"].candidates.is_empty());
        assert!(output.results["f3"].candidates.is_empty());
        assert!(output.results["f4"].candidates.is_empty());
        assert_eq!(output.warnings.len(), 2);
        assert!(output.warnings[0].starts_with("Total"));
    }

    #[tokio::test]
    async fn test_per_field_parallel_matches_sequential() {
        let template = template(vec![
            Field::new("f1", "A", ExtractionMethod::Ai),
            Field::new("f2", "B", ExtractionMethod::Regex { pattern: "B=(\\w+)".to_string() }),
        ]);
        let document = ParsedDocument::text(DocumentType::Word, "A=1 B=2");

        let mut config = ExtractionConfig {
            mode: ExtractionMode::PerField,
            ..Default::default()
        };
        let sequential = TemplateEngine::new(&QueueBackend::new(&["one"]))
            .with_config(config.clone())
            .extract(&template, &document, None, None)
            .await
            .unwrap();

        config.parallel_fields = true;
        let parallel = TemplateEngine::new(&QueueBackend::new(&["one"]))
            .with_config(config)
            .extract(&template, &document, None, None)
            .await
            .unwrap();

        assert_eq!(sequential.results, parallel.results);
        assert_eq!(parallel.results["f1"].selected_values, ["one"]);
        assert_eq!(parallel.results["f2"].selected_values, ["2"]);
    }

    #[tokio::test]
    async fn test_model_failure_aborts_per_field() {
        let backend = QueueBackend::new(&[]);
        let template = template(vec![Field::new("f1", "A", ExtractionMethod::Ai)]);
        let document = ParsedDocument::text(DocumentType::Word, "text");
        let config = ExtractionConfig {
            mode: ExtractionMode::PerField,
            ..Default::default()
        };

        let result = TemplateEngine::new(&backend)
            .with_config(config)
            .extract(&template, &document, None, None)
            .await;
        assert!(result.is_err());
    }
}
