use std::{
    collections::{BTreeMap, HashMap},
    io::ErrorKind,
    path::PathBuf,
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::StorageError;

/// String-keyed storage holding JSON-encoded values.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Default)]
pub struct InMemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.write().await.insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// A single JSON object on disk, rewritten after every mutation.
pub struct FileKeyValueStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileKeyValueStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries: BTreeMap<String, String> = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|error| {
                log::warn!("Ignoring malformed store {}: {error}", path.display());
                BTreeMap::new()
            }),
            Err(error) if error.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(error) => return Err(error.into()),
        };

        log::debug!("Opened store {} with {} keys", path.display(), entries.len());
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let document = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, document).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        let mut updated = entries.clone();
        updated.insert(key.to_owned(), value);
        self.persist(&updated).await?;
        *entries = updated;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut updated = entries.clone();
        updated.remove(key);
        self.persist(&updated).await?;
        *entries = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = FileKeyValueStore::open(&path).await.unwrap();
        store.set("answer", "42".to_owned()).await.unwrap();
        store.set("gone", "1".to_owned()).await.unwrap();
        store.remove("gone").await.unwrap();

        let reopened = FileKeyValueStore::open(&path).await.unwrap();
        assert_eq!(reopened.get("answer").await.unwrap().as_deref(), Some("42"));
        assert_eq!(reopened.get("gone").await.unwrap(), None);
    }

    #[tokio::test]
    async fn malformed_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let store = FileKeyValueStore::open(&path).await.unwrap();

        assert_eq!(store.get("anything").await.unwrap(), None);
        store.set("fresh", "true".to_owned()).await.unwrap();
        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(content.contains("\"fresh\""));
    }

    #[tokio::test]
    async fn failed_write_leaves_entries_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blocked").join("store.json");
        let store = FileKeyValueStore::open(&path).await.unwrap();
        tokio::fs::write(dir.path().join("blocked"), "not a directory").await.unwrap();

        assert!(store.set("answer", "42".to_owned()).await.is_err());

        assert_eq!(store.get("answer").await.unwrap(), None);
    }

    #[tokio::test]
    async fn failed_remove_keeps_the_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blocked").join("store.json");
        let store = FileKeyValueStore::open(&path).await.unwrap();
        store.set("answer", "42".to_owned()).await.unwrap();
        tokio::fs::remove_dir_all(dir.path().join("blocked")).await.unwrap();
        tokio::fs::write(dir.path().join("blocked"), "not a directory").await.unwrap();

        assert!(store.remove("answer").await.is_err());

        assert_eq!(store.get("answer").await.unwrap().as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn in_memory_store_round_trips() {
        let store = InMemoryKeyValueStore::new();

        store.set("key", "value".to_owned()).await.unwrap();
        assert_eq!(store.get("key").await.unwrap().as_deref(), Some("value"));

        store.remove("key").await.unwrap();
        assert_eq!(store.get("key").await.unwrap(), None);
    }
}
