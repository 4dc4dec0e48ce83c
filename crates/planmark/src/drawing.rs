//! Top-level drawing type for opening PDFs and running the annotation pipeline.

use std::collections::HashSet;

use planmark_core::{
    BBox, Block, DrawingExtractor, ExtractError, ExtractOptions, ExtractionResult, Line,
    PageContent, Span,
};
use planmark_parse::{
    ContentHandler, ImageEvent, LopdfBackend, LopdfDocument, PageGeometry, PathEvent, PdfBackend,
    SpanEvent, image_bbox, span_bbox,
};

/// A construction drawing opened for extraction.
///
/// Opening parses the document and resolves every page's geometry up front.
/// After that, extraction never fails partway: page-local problems are
/// logged and the page keeps whatever content was read before them.
///
/// # Example
///
/// ```ignore
/// let drawing = Drawing::open(&bytes, None)?;
/// let result = drawing.extract()?;
/// for (marker, occurrences) in result.markers.iter() {
///     println!("{marker}: {} placements", occurrences.len());
/// }
/// ```
pub struct Drawing {
    doc: LopdfDocument,
    options: ExtractOptions,
    /// Display geometry of each page, in page order.
    geometries: Vec<PageGeometry>,
}

/// Folds interpreter events into a [`PageContent`] tree.
///
/// Each `BT`/`ET` text object becomes one text block and each line-matrix
/// move inside it starts a new line. Painted paths and distinct image
/// XObjects are only counted.
struct PageCollector<'g> {
    geometry: &'g PageGeometry,
    blocks: Vec<Block>,
    /// `(text_object, line)` of the last span appended, while the last block
    /// is still the text block it went into.
    open_text: Option<(usize, usize)>,
    vector_count: usize,
    image_ids: HashSet<(u32, u16)>,
}

impl<'g> PageCollector<'g> {
    fn new(geometry: &'g PageGeometry) -> Self {
        Self {
            geometry,
            blocks: Vec::new(),
            open_text: None,
            vector_count: 0,
            image_ids: HashSet::new(),
        }
    }

    fn into_page(self) -> PageContent {
        let mut page = PageContent::new(
            self.geometry.width(),
            self.geometry.height(),
            self.geometry.rotation(),
        );
        page.blocks = self.blocks;
        page.vector_count = self.vector_count;
        page.image_count = self.image_ids.len();
        page
    }
}

impl ContentHandler for PageCollector<'_> {
    fn on_span(&mut self, event: SpanEvent) {
        let bbox = span_bbox(&event, self.geometry);
        let size = event.effective_size();
        let key = (event.text_object, event.line);
        let span = Span {
            font: event.font_name,
            size,
            ..Span::new(event.text, bbox)
        };

        let same_object = self.open_text.is_some_and(|(object, _)| object == key.0);
        let same_line = self.open_text == Some(key);

        match self.blocks.last_mut() {
            Some(Block::Text {
                bbox: block_bbox,
                lines,
            }) if same_object => {
                *block_bbox = block_bbox.union(&bbox);
                match lines.last_mut() {
                    Some(last) if same_line => {
                        last.bbox = last.bbox.union(&bbox);
                        last.spans.push(span);
                    }
                    _ => lines.push(Line {
                        bbox,
                        spans: vec![span],
                    }),
                }
            }
            _ => self.blocks.push(Block::Text {
                bbox,
                lines: vec![Line {
                    bbox,
                    spans: vec![span],
                }],
            }),
        }
        self.open_text = Some(key);
    }

    fn on_path_painted(&mut self, _event: PathEvent) {
        self.vector_count += 1;
    }

    fn on_image(&mut self, event: ImageEvent) {
        self.image_ids.insert(event.object_id);
        self.blocks.push(Block::Image {
            bbox: image_bbox(&event, self.geometry),
        });
        self.open_text = None;
    }
}

impl Drawing {
    /// Open a drawing from a file path.
    ///
    /// Reads the file into memory and calls [`Drawing::open`].
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::IoError`] if the file cannot be read, or any
    /// error [`Drawing::open`] returns.
    #[cfg(feature = "std")]
    pub fn open_file(
        path: impl AsRef<std::path::Path>,
        options: Option<ExtractOptions>,
    ) -> Result<Self, ExtractError> {
        let bytes =
            std::fs::read(path.as_ref()).map_err(|e| ExtractError::IoError(e.to_string()))?;
        Self::open(&bytes, options)
    }

    /// Open a drawing from PDF bytes.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Raw PDF file bytes.
    /// * `options` - Clustering options and resource limits. Uses defaults if `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::ResourceLimitExceeded`] if the input or its
    /// page count exceeds a configured limit, [`ExtractError::PasswordRequired`]
    /// for encrypted documents, and [`ExtractError::ParseError`] if the bytes
    /// are not a readable PDF.
    pub fn open(bytes: &[u8], options: Option<ExtractOptions>) -> Result<Self, ExtractError> {
        let options = options.unwrap_or_default();

        if let Some(max_bytes) = options.max_input_bytes {
            if bytes.len() > max_bytes {
                return Err(ExtractError::ResourceLimitExceeded {
                    limit_name: "max_input_bytes".to_string(),
                    limit_value: max_bytes,
                    actual_value: bytes.len(),
                });
            }
        }

        let doc = LopdfBackend::open(bytes).map_err(ExtractError::from)?;
        Self::from_doc(doc, options)
    }

    fn from_doc(doc: LopdfDocument, options: ExtractOptions) -> Result<Self, ExtractError> {
        let page_count = LopdfBackend::page_count(&doc);

        if let Some(max_pages) = options.max_pages {
            if page_count > max_pages {
                return Err(ExtractError::ResourceLimitExceeded {
                    limit_name: "max_pages".to_string(),
                    limit_value: max_pages,
                    actual_value: page_count,
                });
            }
        }

        let mut geometries = Vec::with_capacity(page_count);
        for i in 0..page_count {
            let page = LopdfBackend::get_page(&doc, i)?;
            geometries.push(LopdfBackend::page_geometry(&doc, &page)?);
        }

        tracing::debug!(pages = page_count, "opened drawing");

        Ok(Self {
            doc,
            options,
            geometries,
        })
    }

    /// Return the number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.geometries.len()
    }

    /// The options this drawing was opened with.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Display geometry of the page at `index` (0-based).
    pub fn page_geometry(&self, index: usize) -> Option<&PageGeometry> {
        self.geometries.get(index)
    }

    /// Parse one page (0-based) into its content tree.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::PageOutOfRange`] if `index` is not a page of
    /// this document.
    pub fn page_content(&self, index: usize) -> Result<PageContent, ExtractError> {
        let geometry = self
            .geometries
            .get(index)
            .ok_or(ExtractError::PageOutOfRange {
                index,
                count: self.geometries.len(),
            })?;
        let page = LopdfBackend::get_page(&self.doc, index)?;

        let mut collector = PageCollector::new(geometry);
        if let Err(err) =
            LopdfBackend::interpret_page(&self.doc, &page, &mut collector, &self.options)
        {
            tracing::warn!(
                page = index + 1,
                error = %err,
                "content stream aborted, keeping content read so far"
            );
        }
        Ok(collector.into_page())
    }

    /// Parse every page into its content tree, in page order.
    ///
    /// Callers that need both the pipeline result and the raw content can
    /// feed these to [`planmark_core::extract_pages`] instead of parsing
    /// each page twice.
    pub fn page_contents(&self) -> Result<Vec<PageContent>, ExtractError> {
        (0..self.page_count())
            .map(|index| self.page_content(index))
            .collect()
    }

    /// Run the annotation pipeline over every page.
    ///
    /// # Errors
    ///
    /// Only fails if a page cannot be located in the document, which does
    /// not happen for a document that opened successfully.
    pub fn extract(&self) -> Result<ExtractionResult, ExtractError> {
        let all: Vec<usize> = (0..self.page_count()).collect();
        self.extract_pages(&all)
    }

    /// Run the annotation pipeline over a subset of pages (0-based indices).
    ///
    /// Pages keep their document page numbers in the result, and the title
    /// block is mined only from the selected pages.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::PageOutOfRange`] before processing anything
    /// if any index is out of range.
    pub fn extract_pages(&self, indices: &[usize]) -> Result<ExtractionResult, ExtractError> {
        if let Some(&index) = indices.iter().find(|&&i| i >= self.page_count()) {
            return Err(ExtractError::PageOutOfRange {
                index,
                count: self.page_count(),
            });
        }

        let mut extractor = DrawingExtractor::new(self.options.cluster.clone());
        for &index in indices {
            let content = self.page_content(index)?;
            extractor.add_page(index + 1, &content);
        }
        Ok(extractor.finish())
    }
}

/// Open `bytes` with default options and extract every page.
///
/// # Errors
///
/// Returns an error if the document cannot be opened.
pub fn extract_drawing(bytes: &[u8]) -> Result<ExtractionResult, ExtractError> {
    Drawing::open(bytes, None)?.extract()
}

/// Bounding box of all text on a page, if it has any.
pub fn text_extent(page: &PageContent) -> Option<BBox> {
    page.spans()
        .map(|span| span.bbox)
        .reduce(|acc, bbox| acc.union(&bbox))
}

#[cfg(test)]
mod tests {
    use super::*;
    use planmark_core::{Ctm, ElementKind};
    use planmark_parse::PaintOp;

    fn letter() -> PageGeometry {
        PageGeometry::new(BBox::new(0.0, 0.0, 612.0, 792.0), None, 0)
    }

    fn span_event(text: &str, x: f64, y: f64, text_object: usize, line: usize) -> SpanEvent {
        SpanEvent {
            text: text.to_string(),
            font_name: "Helvetica".to_string(),
            font_size: 10.0,
            text_matrix: Ctm::translation(x, y),
            ctm: Ctm::identity(),
            advance: 6.0 * text.len() as f64,
            rise: 0.0,
            ascent: 750.0,
            descent: -250.0,
            text_object,
            line,
        }
    }

    fn image_event(id: u32) -> ImageEvent {
        ImageEvent {
            name: format!("Im{id}"),
            object_id: (id, 0),
            ctm: Ctm::new(100.0, 0.0, 0.0, 50.0, 72.0, 600.0),
            width: 10,
            height: 5,
        }
    }

    #[test]
    fn spans_group_into_blocks_and_lines() {
        let geometry = letter();
        let mut collector = PageCollector::new(&geometry);
        collector.on_span(span_event("BP1", 72.0, 700.0, 0, 0));
        collector.on_span(span_event("DETAIL", 100.0, 700.0, 0, 0));
        collector.on_span(span_event("Scale", 72.0, 680.0, 0, 1));
        collector.on_span(span_event("RW3", 300.0, 400.0, 1, 0));
        let page = collector.into_page();

        assert_eq!(page.blocks.len(), 2);
        let lines = page.blocks[0].lines().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans.len(), 2);
        assert_eq!(lines[1].spans[0].text, "Scale");
        assert_eq!(page.blocks[1].lines().unwrap()[0].spans[0].text, "RW3");
    }

    #[test]
    fn block_bbox_covers_its_spans() {
        let geometry = letter();
        let mut collector = PageCollector::new(&geometry);
        collector.on_span(span_event("A", 72.0, 700.0, 0, 0));
        collector.on_span(span_event("B", 72.0, 680.0, 0, 1));
        let page = collector.into_page();

        // 'A' covers 84.5..94.5, 'B' 104.5..114.5
        assert_eq!(page.blocks[0].bbox(), BBox::new(72.0, 84.5, 78.0, 114.5));
    }

    #[test]
    fn span_carries_font_and_effective_size() {
        let geometry = letter();
        let mut collector = PageCollector::new(&geometry);
        let mut event = span_event("C1", 72.0, 700.0, 0, 0);
        event.ctm = Ctm::new(2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        collector.on_span(event);
        let page = collector.into_page();

        let span = page.spans().next().unwrap();
        assert_eq!(span.font, "Helvetica");
        assert_eq!(span.size, 20.0);
    }

    #[test]
    fn image_between_spans_splits_blocks() {
        let geometry = letter();
        let mut collector = PageCollector::new(&geometry);
        collector.on_span(span_event("A", 72.0, 700.0, 0, 0));
        collector.on_image(image_event(7));
        collector.on_span(span_event("B", 80.0, 700.0, 0, 0));
        let page = collector.into_page();

        assert_eq!(page.blocks.len(), 3);
        assert!(matches!(page.blocks[1], Block::Image { .. }));
        assert_eq!(page.blocks[1].bbox(), BBox::new(72.0, 142.0, 172.0, 192.0));
    }

    #[test]
    fn images_counted_once_per_object() {
        let geometry = letter();
        let mut collector = PageCollector::new(&geometry);
        collector.on_image(image_event(7));
        collector.on_image(image_event(7));
        collector.on_image(image_event(8));
        let page = collector.into_page();
        assert_eq!(page.image_count, 2);
        assert_eq!(page.blocks.len(), 3);
    }

    #[test]
    fn paths_are_counted() {
        let geometry = letter();
        let mut collector = PageCollector::new(&geometry);
        for _ in 0..4 {
            collector.on_path_painted(PathEvent {
                paint_op: PaintOp::Fill,
                segment_count: 4,
                ctm: Ctm::identity(),
            });
        }
        let page = collector.into_page();
        assert_eq!(page.vector_count, 4);
        assert!(page.blocks.is_empty());
    }

    #[test]
    fn collected_page_feeds_the_pipeline() {
        let geometry = letter();
        let mut collector = PageCollector::new(&geometry);
        collector.on_span(span_event("S", 72.0, 700.0, 0, 0));
        collector.on_span(span_event("C", 74.0, 700.0, 1, 0));
        collector.on_span(span_event("1", 76.0, 700.0, 2, 0));
        let page = collector.into_page();

        let mut extractor = DrawingExtractor::new(Default::default());
        let result = extractor.add_page(1, &page).clone();
        assert_eq!(result.elements.len(), 1);
        assert_eq!(result.elements[0].text, "SC1");
        assert_eq!(result.elements[0].kind, ElementKind::Marker);
    }

    #[test]
    fn text_extent_of_empty_page() {
        assert_eq!(text_extent(&PageContent::new(612.0, 792.0, 0)), None);
    }

    #[test]
    fn text_extent_unions_spans() {
        let geometry = letter();
        let mut collector = PageCollector::new(&geometry);
        collector.on_span(span_event("A", 72.0, 700.0, 0, 0));
        collector.on_span(span_event("B", 300.0, 100.0, 1, 0));
        let page = collector.into_page();
        assert_eq!(
            text_extent(&page),
            Some(BBox::new(72.0, 84.5, 306.0, 694.5))
        );
    }
}
