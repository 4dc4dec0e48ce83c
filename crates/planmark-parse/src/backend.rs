//! PDF parsing backend trait.
//!
//! Defines the [`PdfBackend`] trait that abstracts the document parser. The
//! facade only talks to this trait, so the drawing pipeline does not depend
//! on lopdf directly.

use planmark_core::{BBox, ExtractError, ExtractOptions};

use crate::handler::ContentHandler;
use crate::page_geometry::PageGeometry;

/// Trait abstracting PDF parsing operations.
///
/// A backend opens documents, resolves page boxes and rotation, and
/// interprets page content streams through a [`ContentHandler`].
///
/// # Usage
///
/// ```ignore
/// let doc = MyBackend::open(pdf_bytes)?;
/// let page = MyBackend::get_page(&doc, 0)?;
/// let geometry = MyBackend::page_geometry(&doc, &page)?;
/// MyBackend::interpret_page(&doc, &page, &mut handler, &options)?;
/// ```
pub trait PdfBackend {
    /// The parsed PDF document type.
    type Document;

    /// A reference to a single page within a document.
    type Page;

    /// Backend-specific error type, convertible to [`ExtractError`].
    type Error: std::error::Error + Into<ExtractError>;

    /// Parse PDF bytes into a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a readable PDF document or the
    /// document is encrypted.
    fn open(bytes: &[u8]) -> Result<Self::Document, Self::Error>;

    /// Return the number of pages in the document.
    fn page_count(doc: &Self::Document) -> usize;

    /// Access a page by 0-based index.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range.
    fn get_page(doc: &Self::Document, index: usize) -> Result<Self::Page, Self::Error>;

    /// The page's MediaBox as raw PDF coordinates, inherited if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if no MediaBox is found on the page or its ancestors.
    fn page_media_box(doc: &Self::Document, page: &Self::Page) -> Result<BBox, Self::Error>;

    /// The page's CropBox, inherited if needed, or `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if a CropBox exists but is malformed.
    fn page_crop_box(doc: &Self::Document, page: &Self::Page) -> Result<Option<BBox>, Self::Error>;

    /// Page rotation in degrees: 0, 90, 180 or 270.
    ///
    /// # Errors
    ///
    /// Returns an error if `/Rotate` exists but is not an integer.
    fn page_rotate(doc: &Self::Document, page: &Self::Page) -> Result<i32, Self::Error>;

    /// Combined coordinate mapping for a page.
    fn page_geometry(
        doc: &Self::Document,
        page: &Self::Page,
    ) -> Result<PageGeometry, Self::Error> {
        Ok(PageGeometry::new(
            Self::page_media_box(doc, page)?,
            Self::page_crop_box(doc, page)?,
            Self::page_rotate(doc, page)?,
        ))
    }

    /// Interpret the page's content stream, calling back into the handler.
    ///
    /// Events already delivered stay delivered when an error is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the content stream cannot be decoded.
    fn interpret_page(
        doc: &Self::Document,
        page: &Self::Page,
        handler: &mut dyn ContentHandler,
        options: &ExtractOptions,
    ) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{ImageEvent, PaintOp, PathEvent, SpanEvent};
    use planmark_core::Ctm;

    #[derive(Debug)]
    struct MockDocument {
        pages: Vec<MockPageData>,
    }

    #[derive(Debug)]
    struct MockPageData {
        media_box: BBox,
        crop_box: Option<BBox>,
        rotate: i32,
    }

    #[derive(Debug)]
    struct MockPage {
        index: usize,
    }

    #[derive(Default)]
    struct CollectingHandler {
        spans: Vec<SpanEvent>,
        paths: Vec<PathEvent>,
        images: Vec<ImageEvent>,
    }

    impl ContentHandler for CollectingHandler {
        fn on_span(&mut self, event: SpanEvent) {
            self.spans.push(event);
        }

        fn on_path_painted(&mut self, event: PathEvent) {
            self.paths.push(event);
        }

        fn on_image(&mut self, event: ImageEvent) {
            self.images.push(event);
        }
    }

    struct MockBackend;

    impl PdfBackend for MockBackend {
        type Document = MockDocument;
        type Page = MockPage;
        type Error = ExtractError;

        fn open(bytes: &[u8]) -> Result<Self::Document, Self::Error> {
            if bytes.is_empty() {
                return Err(ExtractError::ParseError("empty input".to_string()));
            }
            // first byte encodes the page count, second (optional) the rotation / 90
            let rotate = bytes.get(1).map_or(0, |r| i32::from(*r) * 90);
            let pages = (0..bytes[0])
                .map(|_| MockPageData {
                    media_box: BBox::new(0.0, 0.0, 612.0, 792.0),
                    crop_box: None,
                    rotate,
                })
                .collect();
            Ok(MockDocument { pages })
        }

        fn page_count(doc: &Self::Document) -> usize {
            doc.pages.len()
        }

        fn get_page(doc: &Self::Document, index: usize) -> Result<Self::Page, Self::Error> {
            if index >= doc.pages.len() {
                return Err(ExtractError::PageOutOfRange {
                    index,
                    count: doc.pages.len(),
                });
            }
            Ok(MockPage { index })
        }

        fn page_media_box(doc: &Self::Document, page: &Self::Page) -> Result<BBox, Self::Error> {
            Ok(doc.pages[page.index].media_box)
        }

        fn page_crop_box(
            doc: &Self::Document,
            page: &Self::Page,
        ) -> Result<Option<BBox>, Self::Error> {
            Ok(doc.pages[page.index].crop_box)
        }

        fn page_rotate(doc: &Self::Document, page: &Self::Page) -> Result<i32, Self::Error> {
            Ok(doc.pages[page.index].rotate)
        }

        fn interpret_page(
            _doc: &Self::Document,
            _page: &Self::Page,
            handler: &mut dyn ContentHandler,
            _options: &ExtractOptions,
        ) -> Result<(), Self::Error> {
            handler.on_span(SpanEvent {
                text: "SC1".to_string(),
                font_name: "Helvetica".to_string(),
                font_size: 10.0,
                text_matrix: Ctm::translation(72.0, 720.0),
                ctm: Ctm::identity(),
                advance: 18.0,
                rise: 0.0,
                ascent: 750.0,
                descent: -250.0,
                text_object: 0,
                line: 0,
            });
            handler.on_path_painted(PathEvent {
                paint_op: PaintOp::Stroke,
                segment_count: 2,
                ctm: Ctm::identity(),
            });
            handler.on_image(ImageEvent {
                name: "Im1".to_string(),
                object_id: (9, 0),
                ctm: Ctm::new(100.0, 0.0, 0.0, 75.0, 72.0, 600.0),
                width: 400,
                height: 300,
            });
            Ok(())
        }
    }

    #[test]
    fn open_and_count() {
        let doc = MockBackend::open(&[3]).unwrap();
        assert_eq!(MockBackend::page_count(&doc), 3);
    }

    #[test]
    fn open_empty_bytes_fails() {
        let err = MockBackend::open(&[]).unwrap_err();
        assert!(matches!(err, ExtractError::ParseError(_)));
    }

    #[test]
    fn get_page_out_of_bounds() {
        let doc = MockBackend::open(&[2]).unwrap();
        let err = MockBackend::get_page(&doc, 5).unwrap_err();
        assert_eq!(err, ExtractError::PageOutOfRange { index: 5, count: 2 });
    }

    #[test]
    fn default_page_geometry_combines_boxes() {
        let doc = MockBackend::open(&[1]).unwrap();
        let page = MockBackend::get_page(&doc, 0).unwrap();
        let geometry = MockBackend::page_geometry(&doc, &page).unwrap();
        assert_eq!(geometry.width(), 612.0);
        assert_eq!(geometry.height(), 792.0);
        assert_eq!(geometry.rotation(), 0);
    }

    #[test]
    fn default_page_geometry_applies_rotation() {
        let doc = MockBackend::open(&[1, 1]).unwrap();
        let page = MockBackend::get_page(&doc, 0).unwrap();
        let geometry = MockBackend::page_geometry(&doc, &page).unwrap();
        assert_eq!(geometry.rotation(), 90);
        assert_eq!(geometry.width(), 792.0);
        assert_eq!(geometry.height(), 612.0);
    }

    #[test]
    fn interpret_page_through_trait_object() {
        let doc = MockBackend::open(&[1]).unwrap();
        let page = MockBackend::get_page(&doc, 0).unwrap();
        let mut handler = CollectingHandler::default();
        let handler_ref: &mut dyn ContentHandler = &mut handler;
        MockBackend::interpret_page(&doc, &page, handler_ref, &ExtractOptions::default())
            .unwrap();

        assert_eq!(handler.spans.len(), 1);
        assert_eq!(handler.spans[0].text, "SC1");
        assert_eq!(handler.paths.len(), 1);
        assert_eq!(handler.images[0].width, 400);
    }
}
