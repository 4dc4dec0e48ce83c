use crate::fragment::TextFragment;
use crate::options::ClusterOptions;

/// A run of text reconstructed from one or more adjacent fragments.
///
/// Same shape as a fragment; `x`, `y`, `font` and `size` come from the first
/// fragment merged into it.
pub type ClusteredRun = TextFragment;

/// Merges fragmented CAD text back into coherent runs by proximity.
///
/// Vector and CAD exporters frequently emit a single visual word as several
/// one- or two-character spans. The clusterer sorts a page's fragments
/// top-to-bottom, left-to-right and then folds each fragment into the run
/// before it when both sit on the same line and the fragment starts close to
/// where the run is estimated to end.
pub struct TextClusterer;

impl TextClusterer {
    /// Cluster one page's fragments into runs.
    ///
    /// Fragments are sorted by `(y, x)` with no tolerance in the sort key.
    /// A fragment continues the current run when:
    /// - `|fragment.y - run.y| < line_tolerance`, and
    /// - `fragment.x - (run.x + char_width * run_text_len) < threshold`.
    ///
    /// The width estimate is a fixed per-character constant rather than a
    /// font metric, so mixed font sizes on one line may over- or under-merge.
    pub fn cluster(fragments: &[TextFragment], options: &ClusterOptions) -> Vec<ClusteredRun> {
        let mut sorted: Vec<&TextFragment> = fragments.iter().collect();
        sorted.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));

        let mut iter = sorted.into_iter();
        let Some(first) = iter.next() else {
            return Vec::new();
        };

        let mut runs = Vec::new();
        let mut current = first.clone();

        for next in iter {
            if Self::continues(&current, next, options) {
                Self::merge(&mut current, next);
            } else {
                let finished = std::mem::replace(&mut current, next.clone());
                if !finished.text.trim().is_empty() {
                    runs.push(finished);
                }
            }
        }

        if !current.text.trim().is_empty() {
            runs.push(current);
        }

        runs
    }

    /// Whether `next` belongs to the run `current`.
    fn continues(current: &ClusteredRun, next: &TextFragment, options: &ClusterOptions) -> bool {
        let same_line = (next.y - current.y).abs() < options.line_tolerance;
        let estimated_end = current.x + current.text.chars().count() as f64 * options.char_width;
        let close_horizontally = next.x - estimated_end < options.threshold;
        same_line && close_horizontally
    }

    /// Append `next` to `current`. The run's left/top edges stay fixed while
    /// its right/bottom edges only ever grow.
    fn merge(current: &mut ClusteredRun, next: &TextFragment) {
        current.text.push_str(&next.text);
        current.bbox.x1 = current.bbox.x1.max(next.bbox.x1);
        current.bbox.bottom = current.bbox.bottom.max(next.bbox.bottom);
    }
}
