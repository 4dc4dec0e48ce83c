//! Text state machine for the content stream interpreter.
//!
//! Tracks text objects (`BT`/`ET`), the text and line matrices, and the text
//! state parameters set by `Tf Tc Tw Tz TL Ts`. Also numbers text objects and
//! line moves so the page collector can rebuild block and line structure.

use planmark_core::Ctm;

/// Text state parameters saved and restored by `q`/`Q`.
///
/// The text and line matrices are not part of the graphics state.
#[derive(Debug, Clone, PartialEq)]
pub struct TextParams {
    /// Character spacing (`Tc`).
    pub char_spacing: f64,
    /// Word spacing (`Tw`), applied to single-byte code 32.
    pub word_spacing: f64,
    /// Horizontal scaling (`Tz`) as a percentage.
    pub h_scaling: f64,
    /// Leading (`TL`).
    pub leading: f64,
    /// Font resource name selected by `Tf`.
    pub font_name: String,
    /// Font size selected by `Tf`.
    pub font_size: f64,
    /// Text rise (`Ts`).
    pub rise: f64,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scaling: 100.0,
            leading: 0.0,
            font_name: String::new(),
            font_size: 0.0,
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextState {
    pub params: TextParams,
    in_text_object: bool,
    text_matrix: Ctm,
    line_matrix: Ctm,
    /// Text objects begun so far on this page.
    objects_begun: usize,
    /// Line moves inside the current text object.
    line: usize,
}

impl TextState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_text_object(&self) -> bool {
        self.in_text_object
    }

    pub fn text_matrix(&self) -> &Ctm {
        &self.text_matrix
    }

    pub fn line_matrix(&self) -> &Ctm {
        &self.line_matrix
    }

    /// Sequence number of the current (or last) text object, starting at 0.
    pub fn text_object(&self) -> usize {
        self.objects_begun.saturating_sub(1)
    }

    /// Line number inside the current text object, starting at 0.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Horizontal scaling as a fraction (1.0 = 100%).
    pub fn h_scale(&self) -> f64 {
        self.params.h_scaling / 100.0
    }

    /// `BT`: reset both matrices and open a new text object.
    pub fn begin_text(&mut self) {
        self.text_matrix = Ctm::identity();
        self.line_matrix = Ctm::identity();
        self.in_text_object = true;
        self.objects_begun += 1;
        self.line = 0;
    }

    /// `ET`
    pub fn end_text(&mut self) {
        self.in_text_object = false;
    }

    /// `Tf`
    pub fn set_font(&mut self, font_name: String, font_size: f64) {
        self.params.font_name = font_name;
        self.params.font_size = font_size;
    }

    /// `Tm`: replace both matrices.
    pub fn set_text_matrix(&mut self, m: Ctm) {
        self.text_matrix = m;
        self.line_matrix = m;
        self.line += 1;
    }

    /// `Td`: translate the line matrix and restart the text matrix there.
    pub fn move_text_position(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Ctm::translation(tx, ty).concat(&self.line_matrix);
        self.text_matrix = self.line_matrix;
        self.line += 1;
    }

    /// `TD`: `-ty TL` followed by `tx ty Td`.
    pub fn move_text_position_and_set_leading(&mut self, tx: f64, ty: f64) {
        self.params.leading = -ty;
        self.move_text_position(tx, ty);
    }

    /// `T*`: `0 -TL Td`.
    pub fn move_to_next_line(&mut self) {
        let leading = self.params.leading;
        self.move_text_position(0.0, -leading);
    }

    /// Advance the text matrix by `tx` text space units.
    pub fn advance(&mut self, tx: f64) {
        self.text_matrix = Ctm::translation(tx, 0.0).concat(&self.text_matrix);
    }

    /// Horizontal displacement of one glyph in text space.
    ///
    /// `width` is in glyph space (1/1000 of text space). Word spacing applies
    /// only to single-byte code 32.
    pub fn glyph_advance(&self, width: f64, is_space: bool) -> f64 {
        let word_spacing = if is_space {
            self.params.word_spacing
        } else {
            0.0
        };
        ((width / 1000.0) * self.params.font_size + self.params.char_spacing + word_spacing)
            * self.h_scale()
    }

    /// Displacement of a `TJ` number adjustment. Positive values move left.
    pub fn adjustment_advance(&self, adjustment: f64) -> f64 {
        -(adjustment / 1000.0) * self.params.font_size * self.h_scale()
    }
}
