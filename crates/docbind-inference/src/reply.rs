//! Tolerant reading of replies from the vision model.
//!
//! The vision model is asked for JSON but may answer in free text. Both are
//! accepted: JSON objects are mined for `value`, `confidence` and
//! `candidates`; anything else becomes a single low-confidence text value.

use serde_json::Value;

/// Confidence assumed when a JSON reply carries none.
pub const DEFAULT_JSON_CONFIDENCE: f32 = 0.9;

/// Confidence assigned to a free-text reply.
pub const DEFAULT_TEXT_CONFIDENCE: f32 = 0.8;

/// One ranked candidate as reported by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyCandidate {
    pub value: Value,
    pub confidence: Option<f32>,
    pub context: Option<String>,
}

/// A parsed vision reply.
#[derive(Debug, Clone, PartialEq)]
pub struct VisionReply {
    /// The primary value (string, array, or any JSON value).
    pub value: Value,
    /// Confidence of the primary value.
    pub confidence: f32,
    /// The model's own ranked candidate list, when it gave one.
    pub candidates: Option<Vec<ReplyCandidate>>,
}

impl VisionReply {
    /// Parse raw reply content.
    pub fn parse(content: &str) -> Self {
        let body = strip_code_fence(content);

        match serde_json::from_str::<Value>(body) {
            Ok(json) => Self::from_json(json),
            Err(_) => Self {
                value: Value::String(content.trim().to_string()),
                confidence: DEFAULT_TEXT_CONFIDENCE,
                candidates: None,
            },
        }
    }

    fn from_json(json: Value) -> Self {
        // An explicit empty or null value means nothing was found.
        let value = match json.get("value") {
            Some(v) => v.clone(),
            None if json.get("candidates").is_some() => Value::Null,
            None => json.clone(),
        };

        let confidence = json
            .get("confidence")
            .and_then(Value::as_f64)
            .filter(|c| *c > 0.0)
            .map(|c| c as f32)
            .unwrap_or(DEFAULT_JSON_CONFIDENCE);

        let candidates = json
            .get("candidates")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(ReplyCandidate::from_json).collect());

        Self {
            value,
            confidence,
            candidates,
        }
    }

    /// The primary value as text. Strings are returned as-is, other JSON
    /// values are serialized.
    pub fn value_text(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl ReplyCandidate {
    fn from_json(item: &Value) -> Self {
        match item {
            Value::Object(map) => Self {
                value: map.get("value").cloned().unwrap_or(Value::Null),
                confidence: map
                    .get("confidence")
                    .and_then(Value::as_f64)
                    .map(|c| c as f32),
                context: map
                    .get("context")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
            other => Self {
                value: other.clone(),
                confidence: None,
                context: None,
            },
        }
    }
}

/// Remove a surrounding Markdown code fence (```json ... ```), if any.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // Skip the info string ("json") on the opening line.
    match rest.find('\n') {
        Some(newline) => rest[newline + 1..].trim(),
        None => rest.trim(),
    }
}
