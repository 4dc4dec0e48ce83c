//! planmark-core: Backend-independent data types and algorithms.
//!
//! This crate provides the page content model handed over by a PDF backend,
//! and the annotation pipeline run over it: fragment collection, proximity
//! clustering, marker classification and title-block mining. It performs no
//! PDF parsing itself.
//!
//! Enable the `serde` feature to serialize [`ExtractionResult`] into the
//! JSON document shape used by downstream tooling.

pub mod cluster;
pub mod content;
pub mod error;
pub mod extract;
pub mod fragment;
pub mod geometry;
pub mod marker;
pub mod options;
pub mod result;
pub mod title_block;

pub use cluster::{ClusteredRun, TextClusterer};
pub use content::{Block, Line, PageContent, Span};
pub use error::ExtractError;
pub use extract::{DrawingExtractor, extract_pages};
pub use fragment::{FragmentCollector, TextFragment};
pub use geometry::{BBox, Ctm, round_to};
pub use marker::{ElementKind, MarkerClassifier, MarkerIndex, MarkerOccurrence};
pub use options::{ClusterOptions, ExtractOptions};
pub use result::{ExtractionResult, PageMetadata, PageResult, Summary, TextElement};
pub use title_block::{DrawingInfo, SheetNumber, TitleBlockExtractor};
