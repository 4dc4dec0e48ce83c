//! Output records of a drawing extraction.
//!
//! Field names and nesting follow the JSON document consumed by downstream
//! quantity-takeoff tooling, so renaming anything here is a breaking change.

use crate::geometry::BBox;
use crate::marker::{ElementKind, MarkerIndex, MarkerOccurrence};
use crate::title_block::DrawingInfo;

/// Raw page geometry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageMetadata {
    /// 1-indexed page number.
    pub page: usize,
    pub width: f64,
    pub height: f64,
    pub rotation: i32,
}

/// A classified run with its page number.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextElement {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub bbox: BBox,
    pub font: String,
    pub size: f64,
    /// 1-indexed page number.
    pub page: usize,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: ElementKind,
}

/// Everything extracted from one page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageResult {
    /// 1-indexed page number.
    pub page: usize,
    /// Page width rounded to 2 decimals.
    pub width: f64,
    /// Page height rounded to 2 decimals.
    pub height: f64,
    pub rotation: i32,
    pub elements: Vec<TextElement>,
    pub vector_count: usize,
    pub has_drawings: bool,
    pub image_count: usize,
}

/// Document-level counts.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Summary {
    pub total_pages: usize,
    /// Number of distinct marker texts.
    pub total_markers: usize,
    /// Number of classified runs, markers and text combined.
    pub total_text_elements: usize,
    /// Distinct marker texts in first-seen order.
    pub marker_types: Vec<String>,
}

/// The whole-document result. Never mutated after it is returned.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractionResult {
    pub metadata: Vec<PageMetadata>,
    pub pages: Vec<PageResult>,
    pub markers: MarkerIndex,
    pub all_text_elements: Vec<TextElement>,
    pub drawing_info: DrawingInfo,
    pub summary: Summary,
}

impl ExtractionResult {
    /// Occurrences of one marker text.
    pub fn marker(&self, text: &str) -> Option<&[MarkerOccurrence]> {
        self.markers.get(text)
    }

    /// Every marker occurrence on a 1-indexed page, grouped by marker text
    /// in first-seen order.
    pub fn markers_on_page(&self, page: usize) -> Vec<(&str, &MarkerOccurrence)> {
        self.markers
            .iter()
            .flat_map(|(text, occ)| occ.iter().map(move |o| (text, o)))
            .filter(|(_, o)| o.page == page)
            .collect()
    }

    /// Recompute the summary from the current contents.
    pub fn summarize(&self) -> Summary {
        Summary {
            total_pages: self.metadata.len(),
            total_markers: self.markers.len(),
            total_text_elements: self.all_text_elements.len(),
            marker_types: self.markers.texts().map(str::to_string).collect(),
        }
    }
}
