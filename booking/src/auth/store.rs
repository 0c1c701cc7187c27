//! File-backed key-value store for the persisted session.
//!
//! The file holds one JSON object mapping keys to string values. A missing
//! file reads as an empty store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use turf_booking_core::environment::{KeyValueStore, StorageError, StorageFuture};

/// Key under which the signed-in user is stored
pub const USER_KEY: &str = "user";

/// JSON-file key-value store
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    /// Serialises every file access, so a read never sees a half-written file
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Store backed by `path`; the file is created on first write
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(error) => Err(StorageError::Io(error)),
        }
    }

    async fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let text = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        tokio::fs::write(&self.path, text).await?;
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> StorageFuture<'_, Option<String>> {
        let key = key.to_string();
        Box::pin(async move {
            let _guard = self.lock.lock().await;
            let mut entries = self.load().await?;
            Ok(entries.remove(&key))
        })
    }

    fn set(&self, key: &str, value: String) -> StorageFuture<'_, ()> {
        let key = key.to_string();
        Box::pin(async move {
            let _guard = self.lock.lock().await;
            let mut entries = self.load().await?;
            entries.insert(key, value);
            self.save(&entries).await
        })
    }

    fn remove(&self, key: &str) -> StorageFuture<'_, ()> {
        let key = key.to_string();
        Box::pin(async move {
            let _guard = self.lock.lock().await;
            let mut entries = self.load().await?;
            if entries.remove(&key).is_some() {
                self.save(&entries).await?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("session.json"));

        assert_eq!(store.get(USER_KEY).await.unwrap(), None);
        store.remove(USER_KEY).await.unwrap();
    }

    #[tokio::test]
    async fn values_survive_a_new_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        FileKeyValueStore::new(&path)
            .set(USER_KEY, "{\"id\":\"1\"}".to_string())
            .await
            .unwrap();

        let reopened = FileKeyValueStore::new(&path);
        assert_eq!(
            reopened.get(USER_KEY).await.unwrap().as_deref(),
            Some("{\"id\":\"1\"}")
        );

        reopened.remove(USER_KEY).await.unwrap();
        assert_eq!(reopened.get(USER_KEY).await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn reads_never_observe_a_partial_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(FileKeyValueStore::new(dir.path().join("session.json")));
        let value = "x".repeat(64 * 1024);

        let writer = {
            let store = std::sync::Arc::clone(&store);
            let value = value.clone();
            tokio::spawn(async move {
                for _ in 0..20 {
                    store.set(USER_KEY, value.clone()).await.unwrap();
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = std::sync::Arc::clone(&store);
                tokio::spawn(async move {
                    for _ in 0..20 {
                        let read = store.get(USER_KEY).await.unwrap();
                        assert!(read.is_none() || read.as_deref().map(str::len) == Some(64 * 1024));
                    }
                })
            })
            .collect();

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
        assert_eq!(store.get(USER_KEY).await.unwrap(), Some(value));
    }

    #[tokio::test]
    async fn corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let result = FileKeyValueStore::new(&path).get(USER_KEY).await;
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
