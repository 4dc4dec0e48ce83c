//! Construction-marker classification.
//!
//! A marker is a short alphanumeric code placed on a structural drawing to
//! identify a component (`BP1` base plate 1, `SC2` steel connection 2, ...).
//! Classification is a table of independent anchored patterns evaluated with
//! "any match" semantics.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::cluster::ClusteredRun;
use crate::geometry::BBox;

/// How a clustered run was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ElementKind {
    /// A construction marker such as `BP1` or `C-1`.
    Marker,
    /// Any other text.
    Text,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Marker => "marker",
            ElementKind::Text => "text",
        }
    }

    pub fn is_marker(&self) -> bool {
        matches!(self, ElementKind::Marker)
    }
}

/// A named marker pattern.
struct MarkerRule {
    name: &'static str,
    pattern: Regex,
}

impl MarkerRule {
    fn new(name: &'static str, pattern: &str) -> Option<Self> {
        Regex::new(pattern)
            .ok()
            .map(|pattern| MarkerRule { name, pattern })
    }
}

/// Marker patterns in evaluation order. Overlaps are expected.
static MARKER_RULES: LazyLock<Vec<MarkerRule>> = LazyLock::new(|| {
    [
        // BP1, SC2, RW3a
        ("letters-digits", r"^[A-Z]{1,4}\d{1,3}[a-z]?$"),
        // C-1, B-12
        ("hyphenated", r"^[A-Z]{1,2}-\d{1,3}$"),
        // A1, B12, C3A
        ("grid-reference", r"^[A-Z]\d{1,3}[A-Z]?$"),
        // SC1, FB4
        ("construction-code", r"^(?:SC|BP|RW|FB|C|B|W)\d{1,3}$"),
    ]
    .into_iter()
    .filter_map(|(name, pattern)| MarkerRule::new(name, pattern))
    .collect()
});

/// Decides marker vs. text for clustered runs.
pub struct MarkerClassifier;

impl MarkerClassifier {
    /// Name of the first rule the trimmed text fully matches, if any.
    pub fn rule_for(text: &str) -> Option<&'static str> {
        let text = text.trim();
        MARKER_RULES
            .iter()
            .find(|rule| rule.pattern.is_match(text))
            .map(|rule| rule.name)
    }

    /// Classify a piece of text. Matching is case-sensitive.
    pub fn classify(text: &str) -> ElementKind {
        if Self::rule_for(text).is_some() {
            ElementKind::Marker
        } else {
            ElementKind::Text
        }
    }
}

/// One place a marker appears in the document.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkerOccurrence {
    pub x: f64,
    pub y: f64,
    pub bbox: BBox,
    /// 1-indexed page number.
    pub page: usize,
}

/// Marker text → every occurrence, in order of discovery.
///
/// Keys are the exact run text (no case folding or trimming beyond what the
/// clusterer already did). Iteration order is first-seen order.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct MarkerIndex {
    entries: IndexMap<String, Vec<MarkerOccurrence>>,
}

impl MarkerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an occurrence of `run` on `page`.
    pub fn record(&mut self, run: &ClusteredRun, page: usize) {
        self.entries
            .entry(run.text.clone())
            .or_default()
            .push(MarkerOccurrence {
                x: run.x,
                y: run.y,
                bbox: run.bbox,
                page,
            });
    }

    /// Occurrences of one marker text.
    pub fn get(&self, text: &str) -> Option<&[MarkerOccurrence]> {
        self.entries.get(text).map(Vec::as_slice)
    }

    /// Distinct marker texts in first-seen order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[MarkerOccurrence])> {
        self.entries
            .iter()
            .map(|(text, occ)| (text.as_str(), occ.as_slice()))
    }

    /// Number of distinct marker texts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of occurrences across all marker texts.
    pub fn occurrence_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}
