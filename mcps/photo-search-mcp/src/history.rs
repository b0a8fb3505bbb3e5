//! Search history - bounded, most-recent-first list of distinct terms
//!
//! The list lives in a single named slot of a [`KeyValueStore`] as a JSON
//! array of strings. Listing never fails the caller: a missing or corrupt
//! slot reads as an empty history. Recording refuses to write when the slot
//! cannot be read, so an unreadable history is never overwritten.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::StorageResult;

/// Maximum number of remembered terms
pub const HISTORY_CAP: usize = 10;

/// Durable string slots
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replace the slot contents; readers never observe a partial value
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove the slot; removing a missing slot is not an error
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// One file per slot under a directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        match std::fs::read_to_string(self.slot_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        // uniquely named sibling, renamed over the slot in one step
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.persist(self.slot_path(key)).map_err(|e| e.error)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        match std::fs::remove_file(self.slot_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process slots, lost on exit
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        slots.remove(key);
        Ok(())
    }
}

/// Recent search terms backed by one storage slot
#[derive(Clone)]
pub struct SearchHistoryStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
    cap: usize,
}

impl SearchHistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            cap: HISTORY_CAP,
        }
    }

    /// History kept only for the lifetime of the process
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), "search_history")
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Move `term` to the front of the history, inserting it if new
    ///
    /// Blank terms are ignored. The whole updated list is written back in
    /// one `set`; a failed read aborts before anything is written.
    pub fn record(&self, term: &str) -> StorageResult<()> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(());
        }

        let mut history = self.read()?;
        history.retain(|existing| existing != term);
        history.insert(0, term.to_string());
        history.truncate(self.cap);

        let encoded = serde_json::to_string(&history)?;
        self.store.set(&self.key, &encoded)
    }

    /// Current history, most recent first
    pub fn list(&self) -> Vec<String> {
        self.read().unwrap_or_else(|e| {
            tracing::warn!("Failed to read search history: {}", e);
            Vec::new()
        })
    }

    /// Stored history; only a missing or corrupt slot reads as empty
    fn read(&self) -> StorageResult<Vec<String>> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(Vec::new());
        };

        Ok(match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!("Ignoring corrupt search history: {}", e);
                Vec::new()
            }
        })
    }

    /// Remove the history slot entirely
    pub fn clear(&self) -> StorageResult<()> {
        self.store.remove(&self.key)
    }
}

/// Store whose every operation fails, for exercising the absorb paths
#[cfg(test)]
pub(crate) struct BrokenStore;

#[cfg(test)]
impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(crate::error::StorageError::Io(std::io::Error::other("storage unavailable")))
    }

    fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(crate::error::StorageError::Io(std::io::Error::other("storage unavailable")))
    }

    fn remove(&self, _key: &str) -> StorageResult<()> {
        Err(crate::error::StorageError::Io(std::io::Error::other("storage unavailable")))
    }
}
