//! Per-field lookups through the vision/language model.

use serde_json::Value;
use tracing::debug;

use docbind_inference::{ImagePayload, InferenceBackend, InferenceRequest, ModelRole, VisionReply};

use super::prompts::ai_field_prompt;
use super::value_text;
use crate::error::Result;
use crate::models::result::{Candidate, CandidateSource, ExtractionResult};
use crate::models::template::Field;

/// Asks the model for one field at a time.
///
/// Single-value fields select the first candidate the model returned.
/// Multi-value fields select every element of the returned value.
pub struct AiStrategy<'a, B: InferenceBackend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: InferenceBackend + ?Sized> AiStrategy<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Extract `field`, attaching `image` when the document has one and
    /// inlining `text` otherwise. Text-only lookups go to the text model.
    pub async fn extract(
        &self,
        field: &Field,
        image: Option<&ImagePayload>,
        text: &str,
    ) -> Result<ExtractionResult> {
        let request = match image {
            Some(image) => InferenceRequest::vision(image.clone(), ai_field_prompt(field, None)),
            None => InferenceRequest::text(ModelRole::Text, ai_field_prompt(field, Some(text))),
        };

        let reply = self.backend.complete(&request).await?;
        debug!("Model replied {} characters for field '{}'", reply.len(), field.name);

        Ok(shape_reply(field, VisionReply::parse(&reply)))
    }
}

/// Turn a parsed reply into a result for `field`.
fn shape_reply(field: &Field, reply: VisionReply) -> ExtractionResult {
    let candidates: Vec<Candidate> = match &reply.candidates {
        Some(list) => list
            .iter()
            .filter_map(|c| {
                let value = value_text(&c.value);
                if value.is_empty() {
                    return None;
                }
                let candidate = Candidate::new(
                    value,
                    c.confidence.unwrap_or(reply.confidence),
                    CandidateSource::Ai,
                );
                Some(match &c.context {
                    Some(context) => candidate.with_context(context.clone()),
                    None => candidate,
                })
            })
            .collect(),
        None => reply_values(&reply.value)
            .into_iter()
            .map(|value| Candidate::new(value, reply.confidence, CandidateSource::Ai))
            .collect(),
    };

    let selected = if field.accepts_multiple() {
        match reply_values(&reply.value) {
            values if values.is_empty() => candidates.iter().map(|c| c.value.clone()).collect(),
            values => values,
        }
    } else {
        candidates
            .first()
            .map(|c| vec![c.value.clone()])
            .unwrap_or_default()
    };

    ExtractionResult::new(field, candidates, selected)
}

/// The reply's primary value as a list: array elements, or the value itself.
fn reply_values(value: &Value) -> Vec<String> {
    let values: Vec<String> = match value {
        Value::Array(items) => items.iter().map(value_text).collect(),
        other => vec![value_text(other)],
    };
    values.into_iter().filter(|v| !v.is_empty()).collect()
}
