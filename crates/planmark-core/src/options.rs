//! Extraction configuration.

/// Options for merging fragments into clustered runs.
///
/// The defaults reproduce the fixed constants of the clustering heuristic:
/// a 5-unit horizontal gap threshold, a strict 2-unit same-line tolerance,
/// and a 2-units-per-character width estimate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterOptions {
    /// Maximum gap between the estimated end of the current run and the next
    /// fragment's x for the two to be merged (exclusive).
    pub threshold: f64,
    /// Maximum vertical distance between a fragment's y and the run's y for
    /// them to count as the same line (exclusive).
    pub line_tolerance: f64,
    /// Estimated width of one character, used in place of font metrics.
    pub char_width: f64,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            threshold: 5.0,
            line_tolerance: 2.0,
            char_width: 2.0,
        }
    }
}

/// Options controlling a whole-document extraction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractOptions {
    /// Clustering parameters applied to every page.
    pub cluster: ClusterOptions,
    /// Reject documents larger than this many bytes.
    pub max_input_bytes: Option<usize>,
    /// Reject documents with more pages than this.
    pub max_pages: Option<usize>,
    /// Maximum Form XObject nesting depth followed by the interpreter.
    pub max_recursion_depth: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            cluster: ClusterOptions::default(),
            max_input_bytes: None,
            max_pages: None,
            max_recursion_depth: 10,
        }
    }
}

impl ExtractOptions {
    /// Builder-style override of the cluster gap threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.cluster.threshold = threshold;
        self
    }
}
