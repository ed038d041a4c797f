use std::{fmt, io};
use thiserror::Error;

/// Unified error type for all framestore operations.
///
/// The variants mirror how callers need to branch: predicate construction
/// distinguishes a literal of the wrong *type family* ([`Error::PredicateType`])
/// from a literal of the right family that cannot be interpreted
/// ([`Error::PredicateValue`]), and pushdown paths that cannot be answered
/// correctly surface [`Error::Unsupported`] instead of a silent wrong result.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during blob store or file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Arrow library error during columnar data operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet library error during encode or decode.
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Predicate literal belongs to the wrong type family for the column.
    ///
    /// Example: a float literal compared against an integer column. Raised
    /// synchronously at coercion time, before any chunk is read.
    #[error("predicate type mismatch: {0}")]
    PredicateType(String),

    /// Predicate literal is in the right type family but the value itself is
    /// unparsable or unrepresentable.
    ///
    /// Example: the text `"3"` against a date column, or an integer literal
    /// that does not fit the column's width. Callers distinguish this from
    /// [`Error::PredicateType`].
    #[error("predicate value error: {0}")]
    PredicateValue(String),

    /// The operation is not supported and refusing is safer than guessing.
    ///
    /// Example: statistics-based pruning on a binary literal containing an
    /// embedded NUL byte, or any predicate against a `uint64` column.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Invalid user input or API parameter.
    ///
    /// These errors are recoverable: fix the input and retry the operation.
    #[error("Invalid argument: {0}")]
    InvalidArgumentError(String),

    /// Storage key or column not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal error indicating a bug or unexpected state.
    ///
    /// This should never occur during normal operation; the message includes
    /// details about what invariant was violated.
    #[error("An internal operation failed: {0}")]
    Internal(String),
}

impl Error {
    /// Create a [`Error::PredicateType`] from any displayable error.
    #[inline]
    pub fn predicate_type<E: fmt::Display>(err: E) -> Self {
        Error::PredicateType(err.to_string())
    }

    /// Create a [`Error::PredicateValue`] from any displayable error.
    #[inline]
    pub fn predicate_value<E: fmt::Display>(err: E) -> Self {
        Error::PredicateValue(err.to_string())
    }

    /// Create an [`Error::Unsupported`] from any displayable error.
    #[inline]
    pub fn unsupported<E: fmt::Display>(err: E) -> Self {
        Error::Unsupported(err.to_string())
    }
}
