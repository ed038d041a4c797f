//! Blob store abstraction used by the framestore serializer.
//!
//! The serializer only needs two operations: `put` full blobs at string keys
//! and `open` them back as [`bytes::Bytes`]. Returning `Bytes` lets the
//! Parquet reader work over the blob without copying. Durability and
//! read-after-write visibility are the store's responsibility; the
//! serializer never retries.

pub mod fs_store;
pub mod mem_store;
pub mod store;

pub use fs_store::FsStore;
pub use mem_store::MemStore;
pub use store::BlobStore;
