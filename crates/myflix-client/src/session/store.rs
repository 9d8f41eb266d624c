use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use dashmap::DashMap;

use crate::error::StorageResult;

/// String key-value persistence backing the session.
///
/// Batch writes are all-or-nothing: if one fails, none of its changes are
/// visible afterwards.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set_many(&self, entries: &[(&str, &str)]) -> StorageResult<()>;
    fn remove_many(&self, keys: &[&str]) -> StorageResult<()>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.set_many(&[(key, value)])
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.remove_many(&[key])
    }
}

/// Ephemeral store; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> StorageResult<()> {
        for (key, value) in entries {
            self.entries.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> StorageResult<()> {
        for key in keys {
            self.entries.remove(*key);
        }
        Ok(())
    }
}

/// A flat JSON object on disk, rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: DashMap<String, String>,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut stored: BTreeMap<String, String> = BTreeMap::new();
        if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            if !raw.trim().is_empty() {
                stored = serde_json::from_str(&raw)?;
            }
        }
        let entries: DashMap<String, String> = stored.into_iter().collect();

        tracing::debug!("Session file opened at {}", path.display());
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the file; on failure puts `previous` back so memory matches disk.
    fn persist_or_restore(&self, previous: Vec<(String, Option<String>)>) -> StorageResult<()> {
        let result = self.persist();
        if let Err(e) = &result {
            tracing::warn!("Session file write failed, keeping previous state: {e}");
            // undo in reverse so a key written twice ends at its original value
            for (key, old) in previous.into_iter().rev() {
                match old {
                    Some(value) => {
                        self.entries.insert(key, value);
                    }
                    None => {
                        self.entries.remove(&key);
                    }
                }
            }
        }
        result
    }

    fn persist(&self) -> StorageResult<()> {
        let snapshot: BTreeMap<String, String> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        let body = serde_json::to_string_pretty(&snapshot)?;

        // write-then-rename so a crash never leaves a half-written file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, body)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> StorageResult<()> {
        let previous: Vec<(String, Option<String>)> = entries
            .iter()
            .map(|(key, value)| {
                let old = self.entries.insert(key.to_string(), value.to_string());
                (key.to_string(), old)
            })
            .collect();
        self.persist_or_restore(previous)
    }

    fn remove_many(&self, keys: &[&str]) -> StorageResult<()> {
        let previous: Vec<(String, Option<String>)> = keys
            .iter()
            .filter_map(|key| self.entries.remove(*key))
            .map(|(key, old)| (key, Some(old)))
            .collect();
        if previous.is_empty() {
            return Ok(());
        }
        self.persist_or_restore(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileStore::open(&path).unwrap();
        store.set("user", "alice").unwrap();
        store.set("token", "Bearer abc").unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("user").as_deref(), Some("alice"));
        assert_eq!(reopened.get("token").as_deref(), Some("Bearer abc"));

        reopened.remove("user").unwrap();
        let again = FileStore::open(&path).unwrap();
        assert_eq!(again.get("user"), None);
    }

    #[test]
    fn failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("profile");
        let path = parent.join("session.json");

        let store = FileStore::open(&path).unwrap();
        store.set_many(&[("user", "alice"), ("token", "Bearer a")]).unwrap();
        std::fs::remove_dir_all(&parent).unwrap();

        assert!(store.set_many(&[("user", "bob"), ("token", "Bearer b"), ("extra", "x")]).is_err());
        assert_eq!(store.get("user").as_deref(), Some("alice"));
        assert_eq!(store.get("token").as_deref(), Some("Bearer a"));
        assert_eq!(store.get("extra"), None);

        assert!(store.remove_many(&["user", "token"]).is_err());
        assert_eq!(store.get("user").as_deref(), Some("alice"));
        assert_eq!(store.get("token").as_deref(), Some("Bearer a"));
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(FileStore::open(&path).is_err());
    }

    #[test]
    fn empty_file_is_an_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("user"), None);
    }

    #[test]
    fn memory_store_basics() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k"), None);
    }
}
