//! Batch field binding: one model call maps a document onto every field.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use docbind_inference::{InferenceBackend, InferenceError, InferenceRequest, ModelRole};

use super::prompts::binding_prompt;
use super::value_text;
use crate::error::{DocbindError, Result};
use crate::models::result::{Candidate, CandidateSource, ExtractionResult};
use crate::models::template::Field;

/// Binds normalized document content to template fields in a single
/// text-model call.
pub struct FieldBinder<'a, B: InferenceBackend + ?Sized> {
    backend: &'a B,
}

impl<'a, B: InferenceBackend + ?Sized> FieldBinder<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Bind `content` to `fields`. The returned map holds every field name;
    /// fields the model left out map to an empty string.
    pub async fn bind(&self, content: &str, fields: &[&Field]) -> Result<BTreeMap<String, String>> {
        info!("Binding {} fields against {} characters of content", fields.len(), content.len());

        let request = InferenceRequest::text(ModelRole::Text, binding_prompt(fields, content))
            .with_json_output(true);

        let reply = match self.backend.complete(&request).await {
            Ok(reply) => reply,
            Err(InferenceError::EmptyReply) => {
                warn!("Binding reply had no content, treating it as an empty object");
                "{}".to_string()
            }
            Err(e) => return Err(e.into()),
        };
        debug!("Binding reply: {} characters", reply.len());

        parse_binding(&reply, fields)
    }
}

/// Decode a binding reply into a value per field name.
///
/// The reply is decoded directly first, then from the first balanced
/// `{...}` block inside it. Both failing is a [`DocbindError::Binding`].
pub fn parse_binding(reply: &str, fields: &[&Field]) -> Result<BTreeMap<String, String>> {
    let object = decode_object(reply.trim())
        .or_else(|| find_balanced_object(reply).and_then(decode_object))
        .ok_or_else(|| {
            DocbindError::Binding(format!(
                "reply is not a JSON object: {}",
                truncate(reply, 200)
            ))
        })?;

    Ok(fields
        .iter()
        .map(|field| {
            let value = object.get(&field.name).map(value_text).unwrap_or_default();
            (field.name.clone(), value)
        })
        .collect())
}

fn decode_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// The first balanced `{...}` block in `text`. Braces inside JSON strings
/// are ignored.
pub fn find_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// Split a bound value into ranked candidates.
///
/// Comma-separated parts become candidates in order, at 0.95 for the first
/// and 0.05 less for each following one, never below `floor`. Multi-value
/// fields select every part; other fields select the first.
pub fn shape_candidates(
    field: &Field,
    value: &str,
    source: CandidateSource,
    floor: f32,
) -> ExtractionResult {
    let values: Vec<&str> = value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect();

    let candidates: Vec<Candidate> = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let confidence = ((95 - 5 * i as i64) as f32 / 100.0).max(floor);
            Candidate::new(*v, confidence, source)
        })
        .collect();

    let selected: Vec<String> = if field.accepts_multiple() {
        values.iter().map(|v| v.to_string()).collect()
    } else {
        values.first().map(|v| vec![v.to_string()]).unwrap_or_default()
    };

    ExtractionResult::new(field, candidates, selected)
}
