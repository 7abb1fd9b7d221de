//! Regular-expression strategy.

use regex::Regex;

use crate::error::StrategyError;
use crate::extract::{FieldStrategy, StrategyInput, StrategyResult};
use crate::models::result::{Candidate, CandidateSource, ExtractionResult};
use crate::models::template::Field;

/// Confidence of every regex match.
pub const REGEX_CONFIDENCE: f32 = 0.9;

/// Every non-overlapping match of a field-level pattern is a candidate.
///
/// The value is the first capture group when it matched something, the
/// whole match otherwise.
pub struct RegexStrategy {
    pattern: Regex,
}

impl RegexStrategy {
    /// Compile `pattern`.
    pub fn new(pattern: &str) -> Result<Self, StrategyError> {
        if pattern.is_empty() {
            return Err(StrategyError::MissingPattern);
        }
        let pattern =
            Regex::new(pattern).map_err(|e| StrategyError::InvalidPattern(e.to_string()))?;
        Ok(Self { pattern })
    }

    /// All candidates in `text`, in match order.
    pub fn candidates(&self, text: &str) -> Vec<Candidate> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let value = caps
                    .get(1)
                    .filter(|group| !group.as_str().is_empty())
                    .unwrap_or(whole);
                Some(
                    Candidate::new(value.as_str(), REGEX_CONFIDENCE, CandidateSource::Regex)
                        .with_context(whole.as_str()),
                )
            })
            .collect()
    }
}

impl FieldStrategy for RegexStrategy {
    fn extract(&self, field: &Field, input: &StrategyInput<'_>) -> StrategyResult {
        Ok(ExtractionResult::select_first(
            field,
            self.candidates(input.full_text()),
        ))
    }
}
