use bytes::Bytes;
use framestore_result::{Error, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::store::BlobStore;

/// Directory-backed blob store. Each key maps to a file under the root;
/// slashes in keys become subdirectories.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let rel = Path::new(key);
        // Keys must stay inside the root.
        if rel.is_absolute()
            || rel
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::RootDir))
        {
            return Err(Error::InvalidArgumentError(format!(
                "blob key {key:?} must be a relative path without '..'"
            )));
        }
        Ok(self.root.join(rel))
    }
}

impl BlobStore for FsStore {
    fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;
        Ok(())
    }

    fn open(&self, key: &str) -> Result<Bytes> {
        let path = self.resolve(key)?;
        match fs::read(&path) {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(format!("blob key {key:?}")))
            }
            Err(e) => Err(e.into()),
        }
    }
}
