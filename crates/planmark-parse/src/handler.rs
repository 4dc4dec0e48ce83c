//! Content handler callback trait for content stream interpretation.
//!
//! The interpreter walks a page's content stream and reports what it paints
//! through a [`ContentHandler`]. Events carry raw PDF-space geometry; turning
//! them into top-left page coordinates is the consumer's job (see
//! [`crate::span_bbox`]).

use planmark_core::Ctm;

/// The type of paint operation applied to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintOp {
    /// Path is stroked (outlined).
    Stroke,
    /// Path is filled.
    Fill,
    /// Path is both filled and stroked.
    FillAndStroke,
}

/// A run of text shown by one text-showing operator (`Tj`, `TJ`, `'`, `"`).
#[derive(Debug, Clone, PartialEq)]
pub struct SpanEvent {
    /// Decoded Unicode text.
    pub text: String,
    /// Font name without subset prefix.
    pub font_name: String,
    /// Font size set by `Tf`, before any matrix scaling.
    pub font_size: f64,
    /// Text matrix at the start of the span.
    pub text_matrix: Ctm,
    /// CTM at the time the span was shown.
    pub ctm: Ctm,
    /// Total horizontal advance of the span in text space units.
    pub advance: f64,
    /// Text rise (`Ts`).
    pub rise: f64,
    /// Font ascent in glyph space units (1/1000 of text space).
    pub ascent: f64,
    /// Font descent in glyph space units, negative below the baseline.
    pub descent: f64,
    /// Sequence number of the enclosing `BT`/`ET` text object on this page.
    pub text_object: usize,
    /// Sequence number of the line within the text object. Incremented by
    /// every line-matrix move (`Td`, `TD`, `T*`, `Tm`, `'`, `"`).
    pub line: usize,
}

impl SpanEvent {
    /// Size of the text as rendered on the page.
    pub fn effective_size(&self) -> f64 {
        self.font_size * self.text_matrix.concat(&self.ctm).vertical_scale()
    }
}

/// A painted path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathEvent {
    /// The paint operation applied.
    pub paint_op: PaintOp,
    /// Number of construction operators (`m l c v y re h`) in the path.
    pub segment_count: usize,
    /// CTM at the time of painting.
    pub ctm: Ctm,
}

/// A placed image XObject.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageEvent {
    /// Resource name used by `Do` (e.g. "Im0").
    pub name: String,
    /// Object id of the image stream. Placements of the same image share it.
    pub object_id: (u32, u16),
    /// CTM at placement; maps the unit square onto the page.
    pub ctm: Ctm,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

/// Callback handler for content stream interpretation.
///
/// All methods have default no-op implementations, so handlers subscribe
/// only to the events they care about.
pub trait ContentHandler {
    /// Called once per text-showing operator.
    fn on_span(&mut self, _event: SpanEvent) {}

    /// Called when a non-empty path is painted.
    fn on_path_painted(&mut self, _event: PathEvent) {}

    /// Called when an image XObject is placed on the page.
    fn on_image(&mut self, _event: ImageEvent) {}
}
