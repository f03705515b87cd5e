//! The Document Text Model consumed by [`crate::extract`].
//!
//! A renderer turns a PDF into pages, blocks, lines and spans. The core only
//! ever reads this model; nothing here is mutated after construction.
//!
//! Coordinates use a top-left origin: `y` grows downward, so `y0` is the top
//! edge of a box and `y1` its bottom edge.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box `(x0, y0, x1, y1)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        BBox { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// A box with no area.
    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    /// Both boxes are non-empty and share a region of positive area.
    pub fn intersects(&self, other: &BBox) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }

    /// Smallest box covering both `self` and `other`.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// A run of text sharing one font size and style within a line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub size: f32,
    #[serde(default)]
    pub font: String,
    #[serde(default)]
    pub bold: bool,
    pub bbox: BBox,
}

impl Span {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    /// Span texts joined without separators.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Largest span size on the line, `0.0` when empty.
    pub fn max_font_size(&self) -> f32 {
        self.spans.iter().map(|s| s.size).fold(0.0, f32::max)
    }
}

/// A layout-grouped cluster of lines; the unit of title and heading
/// candidacy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub lines: Vec<Line>,
    pub bbox: BBox,
    #[serde(default)]
    pub page: usize,
}

impl Block {
    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.lines.iter().flat_map(|l| l.spans.iter())
    }

    /// Every span text in reading order, concatenated without separators.
    pub fn text(&self) -> String {
        self.spans().map(|s| s.text.as_str()).collect()
    }

    pub fn max_font_size(&self) -> f32 {
        self.spans().map(|s| s.size).fold(0.0, f32::max)
    }

    pub fn is_bold(&self) -> bool {
        self.spans().any(|s| s.bold)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub index: usize,
    pub width: f32,
    pub height: f32,
    pub blocks: Vec<Block>,
}

impl Page {
    /// The band `[0, height * fraction]` spanning the full page width.
    pub fn top_band(&self, fraction: f32) -> BBox {
        BBox::new(0.0, 0.0, self.width, self.height * fraction)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(pages: Vec<Page>) -> Self {
        Document { pages }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.pages
            .iter()
            .flat_map(|p| p.blocks.iter())
            .flat_map(|b| b.spans())
    }
}
