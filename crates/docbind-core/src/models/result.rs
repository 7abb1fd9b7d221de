//! Extraction results: ranked candidates per field.

use serde::{Deserialize, Serialize};

use crate::models::region::BoundingBox;
use crate::models::template::Field;

/// Where a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateSource {
    /// Vision/language model.
    Ai,
    Regex,
    Position,
    /// OCR keyword heuristic.
    Ocr,
    /// Bound from a document that was read without the vision model.
    Direct,
}

/// Page location of a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub page: u32,
    pub bbox: BoundingBox,
}

/// One possible value for a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub value: String,

    /// Confidence score, nominally 0.0 - 1.0.
    pub confidence: f32,

    pub source: CandidateSource,

    /// Surrounding text the value was taken from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Location>,
}

impl Candidate {
    pub fn new(value: impl Into<String>, confidence: f32, source: CandidateSource) -> Self {
        Self {
            value: value.into(),
            confidence,
            source,
            context: None,
            position: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_location(mut self, page: u32, bbox: BoundingBox) -> Self {
        self.position = Some(Location { page, bbox });
        self
    }
}

/// Candidates for one field, best first, plus the currently accepted values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub field_id: String,
    pub field_name: String,
    pub candidates: Vec<Candidate>,
    pub selected_values: Vec<String>,
}

impl ExtractionResult {
    /// A result with no candidates and nothing selected.
    pub fn empty(field: &Field) -> Self {
        Self {
            field_id: field.id.clone(),
            field_name: field.name.clone(),
            candidates: Vec::new(),
            selected_values: Vec::new(),
        }
    }

    /// Build a result from candidates and an explicit selection.
    ///
    /// Candidates are reordered by descending confidence; the sort is stable,
    /// so equal confidences keep their input order.
    pub fn new(field: &Field, mut candidates: Vec<Candidate>, selected_values: Vec<String>) -> Self {
        candidates.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self {
            field_id: field.id.clone(),
            field_name: field.name.clone(),
            candidates,
            selected_values,
        }
    }

    /// Build a result that selects the first candidate, if any.
    pub fn select_first(field: &Field, candidates: Vec<Candidate>) -> Self {
        let selected = candidates
            .first()
            .map(|c| vec![c.value.clone()])
            .unwrap_or_default();
        Self::new(field, candidates, selected)
    }

    /// The best candidate.
    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }
}
