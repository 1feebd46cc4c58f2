//! # FileKvStore
//!
//! Durable `KvStore` backed by a directory: each key lives in `<key>.json`.
//! Writes go to a temporary sibling first and are renamed into place, so a
//! crash mid-write leaves the previous value readable.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use domains::{KvStore, StorageError};
use tokio::fs;

pub struct FileKvStore {
    /// Root directory for all keys (e.g., "./data")
    root_path: PathBuf,
}

impl FileKvStore {
    /// Opens the store, creating `root` if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root_path = root.into();
        fs::create_dir_all(&root_path).await?;
        tracing::debug!(path = %root_path.display(), "file store opened");
        Ok(Self { root_path })
    }

    /// Keys map to file names, so anything that could escape the root is refused.
    fn key_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::Backend(format!("invalid storage key {key:?}")));
        }
        Ok(self.root_path.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KvStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value.as_bytes()).await?;
        fs::rename(&tmp_path, &path).await?;
        Ok(())
    }
}
