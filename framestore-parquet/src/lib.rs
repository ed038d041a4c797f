//! Predicate-aware Parquet serialization for labeled tables.
//!
//! This crate stores a [`DataFrame`] (an Arrow `RecordBatch` plus row-index
//! labels) as a single Parquet blob in a [`framestore_storage::BlobStore`]
//! and restores it selectively. Filtering is pushed down into the read path:
//!
//! - [`ParquetSerializer::store`] splits the frame into row groups of a
//!   configurable target size and persists per-column min/max statistics.
//! - [`ParquetSerializer::restore`] reads the footer first, prunes row groups
//!   whose statistics prove a predicate can never match
//!   ([`pruning::row_group_may_match`]), then evaluates the predicate exactly
//!   against the surviving rows ([`filter::ArrowRowFilter`]).
//!
//! Pruning is conservative (a row group is only skipped when *every* OR-group
//! of the predicate is provably false against its statistics) and purely an
//! optimization: disabling it with
//! [`RestoreOptions::with_predicate_pushdown`] changes I/O volume, never
//! results.
//!
//! # Usage
//!
//! ```rust,no_run
//! use arrow::array::{Int64Array, StringArray};
//! use arrow::datatypes::{DataType, Field, Schema};
//! use arrow::record_batch::RecordBatch;
//! use framestore_expr::{Clause, CompareOp, Predicate};
//! use framestore_parquet::{DataFrame, ParquetSerializer, RestoreOptions};
//! use framestore_storage::MemStore;
//! use std::sync::Arc;
//!
//! # fn main() -> framestore_result::Result<()> {
//! let schema = Arc::new(Schema::new(vec![
//!     Field::new("id", DataType::Int64, false),
//!     Field::new("name", DataType::Utf8, false),
//! ]));
//! let batch = RecordBatch::try_new(
//!     schema,
//!     vec![
//!         Arc::new(Int64Array::from(vec![1, 2, 3])),
//!         Arc::new(StringArray::from(vec!["a", "b", "c"])),
//!     ],
//! )?;
//! let frame = DataFrame::from_batch(batch);
//!
//! let store = MemStore::new();
//! let serializer = ParquetSerializer::new().with_chunk_size(2)?;
//! let key = serializer.store(&store, "prefix/data.parquet", &frame)?;
//!
//! let predicate = Predicate::all_of(vec![Clause::new("id", CompareOp::Eq, 2_i64)])?;
//! let restored = ParquetSerializer::restore(
//!     &store,
//!     &key,
//!     &RestoreOptions::default().with_predicates(predicate),
//! )?;
//! assert_eq!(restored.num_rows(), 1);
//! # Ok(())
//! # }
//! ```

pub mod filter;
pub mod frame;
pub mod pruning;
mod reader;
pub mod serializer;
mod writer;

pub use filter::{ArrowRowFilter, RowFilter};
pub use frame::{DataFrame, INDEX_COLUMN};
pub use serializer::{ParquetSerializer, RestoreOptions};

// Re-export common types for convenience
pub use arrow::record_batch::RecordBatch;
pub use parquet::basic::Compression;
pub use framestore_expr::{Clause, CompareOp, Literal, Predicate};
pub use framestore_storage::BlobStore;
