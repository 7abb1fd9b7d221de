//! Fixed-region strategy over OCR word boxes.

use crate::extract::{FieldStrategy, StrategyInput, StrategyResult};
use crate::models::region::Region;
use crate::models::result::{Candidate, CandidateSource, ExtractionResult};
use crate::models::template::Field;

/// Joins the OCR words that lie entirely inside a page rectangle.
///
/// Always yields exactly one candidate. With no words inside the region the
/// candidate is empty, has confidence 0 and is not selected.
pub struct PositionStrategy {
    region: Region,
    default_word_confidence: f32,
}

impl PositionStrategy {
    pub fn new(region: Region) -> Self {
        Self {
            region,
            default_word_confidence: 0.8,
        }
    }

    /// Confidence assumed for words that report none.
    pub fn with_default_word_confidence(mut self, confidence: f32) -> Self {
        self.default_word_confidence = confidence;
        self
    }
}

impl FieldStrategy for PositionStrategy {
    fn extract(&self, field: &Field, input: &StrategyInput<'_>) -> StrategyResult {
        let ocr = input.require_ocr()?;
        let page = self.region.page();

        let words: Vec<_> = ocr
            .words
            .iter()
            .filter(|w| w.page() == page && self.region.bbox.contains(&w.bbox))
            .collect();

        let value = words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let confidence = if words.is_empty() {
            0.0
        } else {
            words
                .iter()
                .map(|w| w.confidence.unwrap_or(self.default_word_confidence))
                .sum::<f32>()
                / words.len() as f32
        };

        let mut candidate = Candidate::new(value.clone(), confidence, CandidateSource::Position)
            .with_location(page, self.region.bbox);
        if !value.is_empty() {
            candidate = candidate.with_context(value.clone());
        }

        let selected = if value.is_empty() { Vec::new() } else { vec![value] };
        Ok(ExtractionResult::new(field, vec![candidate], selected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StrategyError;
    use crate::models::region::BoundingBox;
    use crate::models::template::ExtractionMethod;
    use crate::ocr::{OcrResult, TextBox};

    fn setup() -> (Field, PositionStrategy) {
        let region = Region::new(1, BoundingBox::new(100.0, 100.0, 200.0, 50.0));
        let field = Field::new("f", "Total", ExtractionMethod::Position { region });
        (field, PositionStrategy::new(region))
    }

    fn ocr(words: Vec<TextBox>) -> OcrResult {
        OcrResult { text: String::new(), words }
    }

    #[test]
    fn test_touching_edges_is_inside() {
        let (field, strategy) = setup();
        let ocr = ocr(vec![
            TextBox::new("left", BoundingBox::new(100.0, 100.0, 50.0, 50.0)).with_confidence(0.9),
            TextBox::new("right", BoundingBox::new(250.0, 100.0, 50.0, 50.0)).with_confidence(0.7),
        ]);
        let result = strategy
            .extract(&field, &StrategyInput::new("", Some(&ocr)))
            .unwrap();

        let candidate = &result.candidates[0];
        assert_eq!(candidate.value, "left right");
        assert!((candidate.confidence - 0.8).abs() < 1e-6);
        assert_eq!(result.selected_values, ["left right"]);
        assert_eq!(candidate.position.unwrap().page, 1);
    }

    #[test]
    fn test_one_unit_over_any_edge_is_outside() {
        let (field, strategy) = setup();
        let ocr = ocr(vec![
            TextBox::new("x-", BoundingBox::new(99.0, 110.0, 10.0, 10.0)),
            TextBox::new("y-", BoundingBox::new(110.0, 99.0, 10.0, 10.0)),
            TextBox::new("x+", BoundingBox::new(291.0, 110.0, 10.0, 10.0)),
            TextBox::new("y+", BoundingBox::new(110.0, 141.0, 10.0, 10.0)),
        ]);
        let result = strategy
            .extract(&field, &StrategyInput::new("", Some(&ocr)))
            .unwrap();

        assert_eq!(result.candidates.len(), 1);
        assert_eq!(result.candidates[0].value, "");
        assert_eq!(result.candidates[0].confidence, 0.0);
        assert!(result.selected_values.is_empty());
    }

    #[test]
    fn test_other_page_ignored_and_default_confidence() {
        let (field, strategy) = setup();
        let ocr = ocr(vec![
            TextBox::new("here", BoundingBox::new(120.0, 110.0, 10.0, 10.0)),
            TextBox::new("there", BoundingBox::new(120.0, 110.0, 10.0, 10.0)).with_page(2),
        ]);
        let result = strategy
            .with_default_word_confidence(0.6)
            .extract(&field, &StrategyInput::new("", Some(&ocr)))
            .unwrap();

        assert_eq!(result.candidates[0].value, "here");
        assert_eq!(result.candidates[0].confidence, 0.6);
    }

    #[test]
    fn test_requires_ocr() {
        let (field, strategy) = setup();
        assert_eq!(
            strategy.extract(&field, &StrategyInput::new("text", None)),
            Err(StrategyError::MissingOcrResult)
        );
    }
}
