//! File storage behind the `/file/:name` endpoints.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid file name: {0:?}")]
    InvalidName(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Named blobs, read and written whole.
#[async_trait]
pub trait FileStore: Send + Sync + 'static {
    /// `Ok(None)` when no file with that name exists.
    async fn read(&self, name: &str) -> Result<Option<Bytes>, StoreError>;

    async fn write(&self, name: &str, contents: &[u8]) -> Result<(), StoreError>;
}

/// Rejects names that could escape the store's directory.
fn check_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Files in a single directory on disk.
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, StoreError> {
        check_name(name)?;
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl FileStore for DiskStore {
    async fn read(&self, name: &str) -> Result<Option<Bytes>, StoreError> {
        let path = self.resolve(name)?;

        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, name: &str, contents: &[u8]) -> Result<(), StoreError> {
        let path = self.resolve(name)?;
        tokio::fs::write(&path, contents).await?;
        Ok(())
    }
}

/// An in-process store, used by tests and embedders without a disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RwLock<HashMap<String, Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, name: impl Into<String>, contents: impl Into<Bytes>) {
        self.files.write().await.insert(name.into(), contents.into());
    }

    pub async fn get(&self, name: &str) -> Option<Bytes> {
        self.files.read().await.get(name).cloned()
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn read(&self, name: &str) -> Result<Option<Bytes>, StoreError> {
        check_name(name)?;
        Ok(self.get(name).await)
    }

    async fn write(&self, name: &str, contents: &[u8]) -> Result<(), StoreError> {
        check_name(name)?;
        self.insert(name, Bytes::copy_from_slice(contents)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("courier-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn rejects_escaping_names() {
        for name in ["", ".", "..", "../etc/passwd", "a/b", "a\\b"] {
            assert!(matches!(check_name(name), Err(StoreError::InvalidName(_))), "{name:?}");
        }
        assert!(check_name("data.txt").is_ok());
    }

    #[tokio::test]
    async fn disk_store_round_trip() {
        let dir = scratch_dir("roundtrip");
        let store = DiskStore::new(&dir);

        store.write("hello.txt", b"hello").await.unwrap();
        let read = store.read("hello.txt").await.unwrap();

        assert_eq!(read.as_deref(), Some(&b"hello"[..]));
        assert_eq!(std::fs::read(dir.join("hello.txt")).unwrap(), b"hello");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn disk_store_missing_file_is_none() {
        let dir = scratch_dir("missing");
        let store = DiskStore::new(&dir);

        assert!(store.read("nope.txt").await.unwrap().is_none());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn disk_store_write_into_missing_directory_fails() {
        let store = DiskStore::new(scratch_dir("gone").join("does-not-exist"));

        assert!(matches!(store.write("x", b"1").await, Err(StoreError::Io(_))));
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryStore::new();

        assert!(store.read("a").await.unwrap().is_none());
        store.write("a", b"contents").await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), Bytes::from_static(b"contents"));
        assert!(store.write("../a", b"x").await.is_err());
    }
}
