//! Word-level OCR results supplied by the caller.
//!
//! OCR itself happens outside this crate. The position and keyword
//! strategies consume its output: full text plus per-word boxes.

use serde::{Deserialize, Serialize};

use crate::models::region::BoundingBox;

/// A recognized word with its box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    /// Recognized text content.
    pub text: String,

    /// Axis-aligned box in page coordinates.
    pub bbox: BoundingBox,

    /// 1-indexed page; missing means the first page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Recognition confidence (0.0 - 1.0), if the engine reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl TextBox {
    pub fn new(text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            text: text.into(),
            bbox,
            page: None,
            confidence: None,
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Page number, defaulting to 1.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1)
    }
}

/// Result of OCR over a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    /// Full text.
    #[serde(default)]
    pub text: String,

    /// Recognized words.
    #[serde(default)]
    pub words: Vec<TextBox>,
}

impl OcrResult {
    /// Build a result from words, ordering them for reading and joining
    /// the full text line by line.
    pub fn from_words(words: Vec<TextBox>) -> Self {
        let mut result = Self {
            text: String::new(),
            words,
        };
        result.sort_by_reading_order();
        result
    }

    /// Sort words by reading order (page, then top-to-bottom, then
    /// left-to-right) and rebuild the full text.
    pub fn sort_by_reading_order(&mut self) {
        self.words.sort_by(|a, b| {
            // Group by approximate vertical position (within 20 units)
            let row_a = (a.bbox.y / 20.0) as i32;
            let row_b = (b.bbox.y / 20.0) as i32;

            a.page()
                .cmp(&b.page())
                .then(row_a.cmp(&row_b))
                .then(
                    a.bbox
                        .x
                        .partial_cmp(&b.bbox.x)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
        });

        let mut text = String::new();
        let mut previous: Option<(u32, i32)> = None;
        for word in &self.words {
            let line = (word.page(), (word.bbox.y / 20.0) as i32);
            match previous {
                Some(prev) if prev == line => text.push(' '),
                Some(_) => text.push('\n'),
                None => {}
            }
            text.push_str(&word.text);
            previous = Some(line);
        }
        self.text = text;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_words_builds_lines() {
        let result = OcrResult::from_words(vec![
            TextBox::new("4821", BoundingBox::new(80.0, 10.0, 30.0, 10.0)),
            TextBox::new("Total", BoundingBox::new(0.0, 50.0, 30.0, 10.0)),
            TextBox::new("No:", BoundingBox::new(10.0, 12.0, 20.0, 10.0)),
        ]);
        assert_eq!(result.text, "No: 4821\nTotal");
    }

    #[test]
    fn test_deserialize_without_text() {
        let result: OcrResult =
            serde_json::from_str(r#"{"words": [{"text": "a", "bbox": {"x": 0, "y": 0, "width": 1, "height": 1}}]}"#)
                .unwrap();
        assert!(result.text.is_empty());
        assert_eq!(result.words[0].page(), 1);
    }
}
