//! planmark: Extract detail markers, text runs and title-block fields from
//! construction drawing PDFs.
//!
//! This is the public API facade. It re-exports the data model from
//! planmark-core and drives planmark-parse to turn PDF pages into the
//! content tree the annotation pipeline consumes.
//!
//! # Architecture
//!
//! - **planmark-core**: Backend-independent types and the annotation pipeline
//! - **planmark-parse**: PDF parsing and content stream interpretation
//! - **planmark** (this crate): Opens drawings and ties the two together
//!
//! # Example
//!
//! ```ignore
//! let result = planmark::extract_drawing(&std::fs::read("S-101.pdf")?)?;
//! println!("{:?}", result.drawing_info.drawing_number);
//! ```

mod drawing;

pub use drawing::{Drawing, extract_drawing, text_extent};
pub use planmark_core;
pub use planmark_core::{
    BBox, Block, ClusterOptions, DrawingExtractor, DrawingInfo, ElementKind, ExtractError,
    ExtractOptions, ExtractionResult, Line, MarkerClassifier, MarkerIndex, MarkerOccurrence,
    PageContent, PageMetadata, PageResult, SheetNumber, Span, Summary, TextElement,
    TitleBlockExtractor, extract_pages,
};
pub use planmark_parse;
pub use planmark_parse::PageGeometry;
