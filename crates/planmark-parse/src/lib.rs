//! planmark-parse: PDF parsing backend and content stream interpreter.
//!
//! This crate opens PDF documents, resolves page geometry and interprets
//! content streams into span, path and image events. The facade turns those
//! events into the [`planmark_core::PageContent`] model the annotation
//! pipeline consumes.

pub mod backend;
pub mod cmap;
pub mod error;
pub mod fonts;
pub mod handler;
mod interpreter;
pub mod interpreter_state;
pub mod lopdf_backend;
pub mod page_geometry;
pub mod text_state;

pub use backend::PdfBackend;
pub use cmap::ToUnicodeCMap;
pub use error::BackendError;
pub use fonts::{FontMetrics, Glyph, LoadedFont, load_font, strip_subset_prefix};
pub use handler::{ContentHandler, ImageEvent, PaintOp, PathEvent, SpanEvent};
pub use interpreter_state::InterpreterState;
pub use lopdf_backend::{LopdfBackend, LopdfDocument, LopdfPage};
pub use page_geometry::{PageGeometry, image_bbox, normalize_rotation, span_bbox};
pub use planmark_core;
pub use text_state::{TextParams, TextState};
