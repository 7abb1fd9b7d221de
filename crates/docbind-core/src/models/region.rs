//! Page rectangles shared by templates, OCR words and candidates.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whether `other` lies entirely inside this box. Edges are inclusive.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// A rectangle on a given page. Pages are 1-indexed; a missing page means
/// the first page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Region {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(flatten)]
    pub bbox: BoundingBox,
}

impl Region {
    pub fn new(page: u32, bbox: BoundingBox) -> Self {
        Self {
            page: Some(page),
            bbox,
        }
    }

    /// Page number, defaulting to 1.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1)
    }
}
