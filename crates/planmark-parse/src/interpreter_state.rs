//! Graphics state stack for the content stream interpreter.
//!
//! Tracks the current transformation matrix and saves it, together with the
//! text state parameters, on `q` and restores both on `Q`.

use planmark_core::Ctm;

use crate::text_state::TextParams;

/// Interpreter-level graphics state: the CTM and the `q`/`Q` stack.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterpreterState {
    ctm: Ctm,
    stack: Vec<SavedState>,
}

#[derive(Debug, Clone, PartialEq)]
struct SavedState {
    ctm: Ctm,
    text: TextParams,
}

impl InterpreterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current transformation matrix.
    pub fn ctm(&self) -> &Ctm {
        &self.ctm
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// `q`: save the CTM and the given text parameters.
    pub fn save_state(&mut self, text: TextParams) {
        self.stack.push(SavedState {
            ctm: self.ctm,
            text,
        });
    }

    /// `Q`: restore the most recent save, returning its text parameters.
    ///
    /// Returns `None` on an unbalanced `Q`, leaving the state untouched.
    pub fn restore_state(&mut self) -> Option<TextParams> {
        let saved = self.stack.pop()?;
        self.ctm = saved.ctm;
        Some(saved.text)
    }

    /// `cm`: pre-multiply the CTM by the given matrix.
    pub fn concat_matrix(&mut self, m: &Ctm) {
        self.ctm = m.concat(&self.ctm);
    }
}
