//! Keyword heuristic over OCR text.

use super::patterns::{KEYWORD_SEPARATOR, KEYWORD_VALUE};
use crate::extract::{FieldStrategy, StrategyInput, StrategyResult};
use crate::models::result::{Candidate, CandidateSource, ExtractionResult};
use crate::models::template::Field;

/// Confidence of a keyword hit.
pub const KEYWORD_CONFIDENCE: f32 = 0.85;

/// Characters scanned after a keyword for its value.
pub const KEYWORD_WINDOW: usize = 50;

/// Looks for `keyword: value` lines, using fragments of the field name as
/// keywords.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordStrategy;

impl KeywordStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Candidates for every name fragment found in `text`.
    pub fn candidates(&self, name: &str, text: &str) -> Vec<Candidate> {
        KEYWORD_SEPARATOR
            .split(name)
            .map(str::trim)
            .filter(|keyword| !keyword.is_empty())
            .filter_map(|keyword| {
                let start = text.find(keyword)? + keyword.len();
                let window: String = text[start..].chars().take(KEYWORD_WINDOW).collect();
                let caps = KEYWORD_VALUE.captures(&window)?;
                let value = caps.get(1)?.as_str().trim();
                if value.is_empty() {
                    return None;
                }
                Some(
                    Candidate::new(value, KEYWORD_CONFIDENCE, CandidateSource::Ocr)
                        .with_context(&caps[0]),
                )
            })
            .collect()
    }
}

impl FieldStrategy for KeywordStrategy {
    fn extract(&self, field: &Field, input: &StrategyInput<'_>) -> StrategyResult {
        let ocr = input.require_ocr()?;
        Ok(ExtractionResult::select_first(
            field,
            self.candidates(&field.name, &ocr.text),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StrategyError;
    use crate::models::template::ExtractionMethod;
    use crate::ocr::OcrResult;

    fn ocr(text: &str) -> OcrResult {
        OcrResult {
            text: text.to_string(),
            words: Vec::new(),
        }
    }

    #[test]
    fn test_value_after_colon() {
        let field = Field::new("f", "合同编号", ExtractionMethod::Ocr);
        let ocr = ocr("甲方：某公司\n合同编号：HT-2024-001\n日期：2024-05-01");
        let result = KeywordStrategy::new()
            .extract(&field, &StrategyInput::new("", Some(&ocr)))
            .unwrap();

        assert_eq!(result.candidates.len(), 1);
        assert_eq!(result.candidates[0].value, "HT-2024-001");
        assert_eq!(result.candidates[0].confidence, KEYWORD_CONFIDENCE);
        assert_eq!(result.candidates[0].source, CandidateSource::Ocr);
        assert_eq!(result.selected_values, ["HT-2024-001"]);
    }

    #[test]
    fn test_name_fragments_are_separate_keywords() {
        let candidates =
            KeywordStrategy::new().candidates("Invoice No, Number", "Number: 42\nInvoice No: A-1\n");
        let values: Vec<&str> = candidates.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, ["A-1", "42"]);
    }

    #[test]
    fn test_value_beyond_window_is_missed() {
        let text = format!("Total{}: 100", " ".repeat(KEYWORD_WINDOW));
        assert!(KeywordStrategy::new().candidates("Total", &text).is_empty());
    }

    #[test]
    fn test_keyword_without_colon() {
        assert!(KeywordStrategy::new().candidates("Total", "Total 100").is_empty());
    }

    #[test]
    fn test_requires_ocr() {
        let field = Field::new("f", "Total", ExtractionMethod::Ocr);
        assert_eq!(
            KeywordStrategy::new().extract(&field, &StrategyInput::new("Total: 1", None)),
            Err(StrategyError::MissingOcrResult)
        );
    }
}
