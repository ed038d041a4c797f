use bytes::Bytes;
use framestore_result::Result;

/// Key-value blob storage collaborator.
///
/// One serialized object per key, written whole and immutable afterwards.
/// A completed `put` must be fully visible to a subsequent `open` of the
/// same key. No transactional semantics beyond single-key atomic visibility
/// are assumed.
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `key`, replacing any previous value.
    fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()>;

    /// Open the blob at `key` for reading.
    ///
    /// `Bytes` is cheaply cloneable and seekable, which is all the Parquet
    /// footer/row-group reader needs.
    fn open(&self, key: &str) -> Result<Bytes>;
}
