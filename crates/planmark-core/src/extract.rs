//! Whole-document aggregation.
//!
//! [`DrawingExtractor`] owns all cross-page state of one extraction: the
//! running marker index and the ordered list of classified runs whose text
//! feeds the title-block search. Pages are added strictly in order and the
//! result is produced once by [`DrawingExtractor::finish`].

use crate::cluster::TextClusterer;
use crate::content::PageContent;
use crate::fragment::FragmentCollector;
use crate::geometry::round_to;
use crate::marker::MarkerClassifier;
use crate::options::ClusterOptions;
use crate::result::{ExtractionResult, PageMetadata, PageResult, TextElement};
use crate::title_block::TitleBlockExtractor;

/// Incrementally builds an [`ExtractionResult`] page by page.
#[derive(Debug)]
pub struct DrawingExtractor {
    options: ClusterOptions,
    result: ExtractionResult,
}

impl DrawingExtractor {
    pub fn new(options: ClusterOptions) -> Self {
        Self {
            options,
            result: ExtractionResult::default(),
        }
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.result.pages.len()
    }

    /// Run the per-page pipeline (collect → cluster → classify) and fold the
    /// page into the document result.
    ///
    /// `page_number` is 1-indexed and is copied onto every element and
    /// marker occurrence of the page.
    pub fn add_page(&mut self, page_number: usize, page: &PageContent) -> &PageResult {
        self.result.metadata.push(PageMetadata {
            page: page_number,
            width: page.width,
            height: page.height,
            rotation: page.rotation,
        });

        let fragments = FragmentCollector::collect(page);
        let runs = TextClusterer::cluster(&fragments, &self.options);

        let mut elements = Vec::with_capacity(runs.len());
        for run in &runs {
            let kind = MarkerClassifier::classify(&run.text);
            if kind.is_marker() {
                self.result.markers.record(run, page_number);
            }
            elements.push(TextElement {
                text: run.text.clone(),
                x: run.x,
                y: run.y,
                bbox: run.bbox,
                font: run.font.clone(),
                size: run.size,
                page: page_number,
                kind,
            });
        }

        tracing::debug!(
            page = page_number,
            fragments = fragments.len(),
            runs = runs.len(),
            markers = elements.iter().filter(|e| e.kind.is_marker()).count(),
            vector_count = page.vector_count,
            image_count = page.image_count,
            "processed page"
        );

        self.result.all_text_elements.extend(elements.iter().cloned());
        self.result.pages.push(PageResult {
            page: page_number,
            width: round_to(page.width, 2),
            height: round_to(page.height, 2),
            rotation: page.rotation,
            elements,
            vector_count: page.vector_count,
            has_drawings: page.vector_count > 0,
            image_count: page.image_count,
        });

        // just pushed
        &self.result.pages[self.result.pages.len() - 1]
    }

    /// Mine the title block from all collected text and return the result.
    pub fn finish(mut self) -> ExtractionResult {
        self.result.drawing_info = TitleBlockExtractor::extract_from_runs(
            self.result
                .all_text_elements
                .iter()
                .map(|e| e.text.as_str()),
        );
        self.result.summary = self.result.summarize();

        tracing::debug!(
            pages = self.result.summary.total_pages,
            markers = self.result.summary.total_markers,
            elements = self.result.summary.total_text_elements,
            "finished extraction"
        );

        self.result
    }
}

/// Run the full pipeline over pages that are already parsed.
///
/// Pages are numbered from 1 in iteration order.
pub fn extract_pages<I>(pages: I, options: &ClusterOptions) -> ExtractionResult
where
    I: IntoIterator,
    I::Item: std::borrow::Borrow<PageContent>,
{
    use std::borrow::Borrow;

    let mut extractor = DrawingExtractor::new(options.clone());
    for (index, page) in pages.into_iter().enumerate() {
        extractor.add_page(index + 1, page.borrow());
    }
    extractor.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Block, Line, Span};
    use crate::geometry::BBox;
    use crate::marker::ElementKind;

    /// One text block with one span per `(text, x, y)`.
    fn page(spans: &[(&str, f64, f64)]) -> PageContent {
        let mut page = PageContent::new(612.0, 792.0, 0);
        page.blocks.push(Block::Text {
            bbox: BBox::default(),
            lines: vec![Line {
                bbox: BBox::default(),
                spans: spans
                    .iter()
                    .map(|(t, x, y)| {
                        let mut span =
                            Span::new(*t, BBox::new(*x, *y, *x + 6.0 * t.len() as f64, *y + 12.0));
                        span.font = "Helvetica".to_string();
                        span.size = 12.0;
                        span
                    })
                    .collect(),
            }],
        });
        page
    }

    #[test]
    fn empty_document() {
        let result = extract_pages(Vec::<PageContent>::new(), &ClusterOptions::default());
        assert!(result.metadata.is_empty());
        assert!(result.pages.is_empty());
        assert!(result.markers.is_empty());
        assert!(result.all_text_elements.is_empty());
        assert!(result.drawing_info.is_empty());
        assert_eq!(result.summary.total_pages, 0);
    }

    #[test]
    fn classifies_and_indexes_markers() {
        let p = page(&[
            ("SC1 BASE PLATE DETAIL", 100.0, 90.0),
            ("RW3", 300.0, 90.0),
            ("BP2 - Steel Connection", 100.0, 120.0),
            ("C1", 300.0, 120.0),
        ]);
        let result = extract_pages([p], &ClusterOptions::default());

        let kinds: Vec<(&str, ElementKind)> = result
            .all_text_elements
            .iter()
            .map(|e| (e.text.as_str(), e.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("SC1 BASE PLATE DETAIL", ElementKind::Text),
                ("RW3", ElementKind::Marker),
                ("BP2 - Steel Connection", ElementKind::Text),
                ("C1", ElementKind::Marker),
            ]
        );
        assert_eq!(result.summary.marker_types, vec!["RW3", "C1"]);
        assert_eq!(result.pages[0].elements.len(), 4);
    }

    #[test]
    fn same_marker_on_two_pages_is_one_entry() {
        let pages = vec![page(&[("BP1", 10.0, 10.0)]), page(&[("BP1", 50.0, 60.0)])];
        let result = extract_pages(&pages, &ClusterOptions::default());

        assert_eq!(result.markers.len(), 1);
        let occ = result.marker("BP1").unwrap();
        assert_eq!(occ.len(), 2);
        assert_eq!((occ[0].page, occ[0].x), (1, 10.0));
        assert_eq!((occ[1].page, occ[1].x), (2, 50.0));
        assert_eq!(result.summary.total_markers, 1);
        assert_eq!(result.summary.total_text_elements, 2);
    }

    #[test]
    fn summary_counts_runs_not_fragments() {
        // "S","C","1" merge into a single run
        let p = page(&[("S", 10.0, 100.0), ("C", 12.0, 100.0), ("1", 14.0, 100.0)]);
        let result = extract_pages([p], &ClusterOptions::default());
        assert_eq!(result.summary.total_text_elements, 1);
        assert_eq!(result.all_text_elements[0].text, "SC1");
        assert_eq!(result.all_text_elements[0].kind, ElementKind::Marker);
    }

    #[test]
    fn title_block_spans_all_pages() {
        let pages = vec![
            page(&[("Drawing: DWG-001 Rev: A", 100.0, 160.0)]),
            page(&[("Scale: 1:50", 100.0, 190.0)]),
        ];
        let result = extract_pages(&pages, &ClusterOptions::default());
        assert_eq!(result.drawing_info.drawing_number.as_deref(), Some("001"));
        assert_eq!(result.drawing_info.revision.as_deref(), Some("A"));
        assert_eq!(result.drawing_info.scale.as_deref(), Some("1:50"));
        assert_eq!(result.drawing_info.date, None);
    }

    #[test]
    fn page_geometry_and_counts() {
        let mut p = PageContent::new(841.8898, 595.2756, 90);
        p.vector_count = 42;
        p.image_count = 1;
        let result = extract_pages([p], &ClusterOptions::default());

        assert_eq!(result.metadata[0].width, 841.8898);
        assert_eq!(result.pages[0].width, 841.89);
        assert_eq!(result.pages[0].height, 595.28);
        assert_eq!(result.pages[0].rotation, 90);
        assert!(result.pages[0].has_drawings);
        assert_eq!(result.pages[0].vector_count, 42);
        assert_eq!(result.pages[0].image_count, 1);
    }

    #[test]
    fn blank_page_has_no_drawings() {
        let result = extract_pages([PageContent::new(612.0, 792.0, 0)], &ClusterOptions::default());
        assert!(!result.pages[0].has_drawings);
        assert!(result.pages[0].elements.is_empty());
        assert_eq!(result.summary.total_pages, 1);
    }

    #[test]
    fn deterministic_across_runs() {
        let pages = vec![
            page(&[("BP1", 10.0, 10.0), ("SC2", 200.0, 10.0), ("SHEET 1 OF 2", 400.0, 700.0)]),
            page(&[("BP1", 30.0, 30.0)]),
        ];
        let a = extract_pages(&pages, &ClusterOptions::default());
        let b = extract_pages(&pages, &ClusterOptions::default());
        assert_eq!(a, b);
    }

    #[test]
    fn add_page_returns_page_result() {
        let mut extractor = DrawingExtractor::new(ClusterOptions::default());
        let page_result = extractor.add_page(1, &page(&[("FB4", 10.0, 10.0)]));
        assert_eq!(page_result.page, 1);
        assert_eq!(page_result.elements[0].kind, ElementKind::Marker);
        assert_eq!(extractor.page_count(), 1);
    }
}
