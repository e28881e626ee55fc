//! Term errors

use thiserror::Error;

/// Malformed term text
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message} (at offset {offset})")]
pub struct FormatError {
    /// What went wrong
    pub message: String,
    /// Byte offset in the input
    pub offset: usize,
}

impl FormatError {
    /// Create a format error at `offset`
    pub fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

/// Errors reading a term from a file or stream
#[derive(Debug, Error)]
pub enum ReadError {
    /// The input could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input is not a valid term
    #[error("Format error: {0}")]
    Format(#[from] FormatError),
}

/// A term does not have the expected shape
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TermError {
    /// The term is of a different kind
    #[error("Expected {expected}, got {actual}: {term}")]
    UnexpectedKind {
        /// The expected kind
        expected: &'static str,
        /// The actual kind
        actual: &'static str,
        /// The offending term
        term: String,
    },

    /// A subterm index past the arity
    #[error("Subterm {index} out of range for term of arity {arity}: {term}")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of subterms
        arity: usize,
        /// The offending term
        term: String,
    },
}

/// Result alias for term accessors
pub type TermResult<T> = Result<T, TermError>;
