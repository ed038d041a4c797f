//! Error types and result definitions for the framestore crates.
//!
//! Every framestore crate returns the unified [`Error`] enum through the
//! [`Result<T>`] alias. Errors propagate upward with the `?` operator; at the
//! serializer boundary callers can match on specific variants.
//!
//! # Error Categories
//!
//! - **I/O errors** ([`Error::Io`]): blob store and file access
//! - **Data format errors** ([`Error::Arrow`], [`Error::Parquet`]): columnar
//!   encode/decode failures
//! - **Predicate type mismatch** ([`Error::PredicateType`]): a literal of the
//!   wrong type family compared against a column
//! - **Predicate value errors** ([`Error::PredicateValue`]): right family,
//!   but the value is unparsable or unrepresentable
//! - **Unsupported pushdown** ([`Error::Unsupported`]): cases the engine
//!   refuses rather than answering wrongly
//! - **User input errors** ([`Error::InvalidArgumentError`]): bad parameters
//! - **Lookup failures** ([`Error::NotFound`]): missing keys or columns
//! - **Internal errors** ([`Error::Internal`]): bugs or unexpected states

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
