//! Error types for the parsing and interpreter layers.
//!
//! Uses [`thiserror`] for error derivation. [`BackendError`] wraps
//! backend-specific failures and converts into [`ExtractError`] at the crate
//! boundary.

use planmark_core::ExtractError;
use thiserror::Error;

/// Error type for PDF parsing backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Error from PDF parsing (structure, syntax, object resolution).
    #[error("PDF parse error: {0}")]
    Parse(String),

    /// Error reading PDF data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error resolving font or encoding information.
    #[error("font error: {0}")]
    Font(String),

    /// Error during content stream interpretation.
    #[error("interpreter error: {0}")]
    Interpreter(String),

    /// A core library error.
    #[error(transparent)]
    Core(#[from] ExtractError),
}

impl From<BackendError> for ExtractError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(msg) => ExtractError::ParseError(msg),
            BackendError::Io(e) => ExtractError::IoError(e.to_string()),
            // Fonts only fail while a document is being read
            BackendError::Font(msg) => ExtractError::ParseError(format!("font: {msg}")),
            BackendError::Interpreter(msg) => ExtractError::InterpreterError(msg),
            BackendError::Core(e) => e,
        }
    }
}
