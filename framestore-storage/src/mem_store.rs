use bytes::Bytes;
use framestore_result::{Error, Result};
use rustc_hash::FxHashMap;
use std::sync::RwLock;

use crate::store::BlobStore;

/// In-memory blob store used for tests and benchmarks.
#[derive(Default)]
pub struct MemStore {
    blobs: RwLock<FxHashMap<String, Bytes>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs
            .read()
            .expect("MemStore blobs read lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All keys currently stored, in arbitrary order.
    pub fn keys(&self) -> Vec<String> {
        self.blobs
            .read()
            .expect("MemStore blobs read lock poisoned")
            .keys()
            .cloned()
            .collect()
    }
}

impl BlobStore for MemStore {
    fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let mut map = self
            .blobs
            .write()
            .expect("MemStore blobs write lock poisoned");
        map.insert(key.to_string(), Bytes::from(bytes));
        Ok(())
    }

    fn open(&self, key: &str) -> Result<Bytes> {
        let map = self
            .blobs
            .read()
            .expect("MemStore blobs read lock poisoned");
        map.get(key)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("blob key {key:?}")))
    }
}
