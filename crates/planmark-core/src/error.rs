//! Error type for planmark.
//!
//! [`ExtractError`] is the single terminal failure of an extraction. It is
//! only ever produced while opening a document (or while reading it from
//! disk); once a document is open every page is processed and page-local
//! anomalies are absorbed instead of surfacing here.

use std::fmt;

/// Fatal error types for drawing extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractError {
    /// The bytes could not be parsed as a PDF document.
    ParseError(String),
    /// I/O error reading the document.
    IoError(String),
    /// Error during content stream interpretation.
    InterpreterError(String),
    /// A configured resource limit was exceeded.
    ResourceLimitExceeded {
        /// Name of the limit that was exceeded (e.g., "max_input_bytes").
        limit_name: String,
        /// The configured limit value.
        limit_value: usize,
        /// The actual value that exceeded the limit.
        actual_value: usize,
    },
    /// The PDF is encrypted and cannot be read without a password.
    PasswordRequired,
    /// A page index outside the document was requested.
    PageOutOfRange {
        /// The requested 0-based index.
        index: usize,
        /// Number of pages in the document.
        count: usize,
    },
    /// Any other error not covered by specific variants.
    Other(String),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::ParseError(msg) => write!(f, "parse error: {msg}"),
            ExtractError::IoError(msg) => write!(f, "I/O error: {msg}"),
            ExtractError::InterpreterError(msg) => write!(f, "interpreter error: {msg}"),
            ExtractError::ResourceLimitExceeded {
                limit_name,
                limit_value,
                actual_value,
            } => write!(
                f,
                "resource limit exceeded: {limit_name} (limit: {limit_value}, actual: {actual_value})"
            ),
            ExtractError::PasswordRequired => write!(f, "PDF is encrypted and requires a password"),
            ExtractError::PageOutOfRange { index, count } => {
                write!(f, "page index {index} out of range (0..{count})")
            }
            ExtractError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ExtractError {}

impl From<std::io::Error> for ExtractError {
    fn from(err: std::io::Error) -> Self {
        ExtractError::IoError(err.to_string())
    }
}
