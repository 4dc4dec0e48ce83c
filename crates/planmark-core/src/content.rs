//! Parsed page content as produced by a document backend.
//!
//! A page is a sequence of [`Block`]s. Text blocks hold [`Line`]s, lines hold
//! [`Span`]s; image blocks carry only a bounding box. This is the shape the
//! fragment collector consumes, independent of which parser produced it.

use crate::geometry::BBox;

/// One page of parsed content plus the page-level counts.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageContent {
    /// Page width in page units (after rotation).
    pub width: f64,
    /// Page height in page units (after rotation).
    pub height: f64,
    /// Page rotation in degrees (0, 90, 180 or 270).
    pub rotation: i32,
    /// Blocks in emission order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub blocks: Vec<Block>,
    /// Number of painted vector paths on the page.
    #[cfg_attr(feature = "serde", serde(default))]
    pub vector_count: usize,
    /// Number of distinct images placed on the page.
    #[cfg_attr(feature = "serde", serde(default))]
    pub image_count: usize,
}

impl PageContent {
    /// An empty page of the given size.
    pub fn new(width: f64, height: f64, rotation: i32) -> Self {
        Self {
            width,
            height,
            rotation,
            ..Self::default()
        }
    }

    /// Iterate over every span on the page in emission order.
    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.blocks
            .iter()
            .filter_map(Block::lines)
            .flatten()
            .flat_map(|line| line.spans.iter())
    }
}

/// A content block on a page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "lowercase")
)]
pub enum Block {
    /// A text object: zero or more lines of spans.
    Text {
        bbox: BBox,
        #[cfg_attr(feature = "serde", serde(default))]
        lines: Vec<Line>,
    },
    /// A placed image. Carries no text.
    Image { bbox: BBox },
}

impl Block {
    /// The block's lines, or `None` for blocks without line content.
    pub fn lines(&self) -> Option<&[Line]> {
        match self {
            Block::Text { lines, .. } if !lines.is_empty() => Some(lines),
            _ => None,
        }
    }

    /// The block's bounding box.
    pub fn bbox(&self) -> BBox {
        match self {
            Block::Text { bbox, .. } | Block::Image { bbox } => *bbox,
        }
    }
}

/// A line of spans sharing one baseline move in the source content.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    pub bbox: BBox,
    #[cfg_attr(feature = "serde", serde(default))]
    pub spans: Vec<Span>,
}

/// A run of text emitted by a single text-showing operation.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Raw text, possibly with surrounding whitespace.
    #[cfg_attr(feature = "serde", serde(default))]
    pub text: String,
    /// Bounding box in top-left origin page coordinates.
    pub bbox: BBox,
    /// Font name without subset prefix; empty when unknown.
    #[cfg_attr(feature = "serde", serde(default))]
    pub font: String,
    /// Effective font size; zero when unknown.
    #[cfg_attr(feature = "serde", serde(default))]
    pub size: f64,
}

impl Span {
    pub fn new(text: impl Into<String>, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            bbox,
            ..Self::default()
        }
    }
}
