//! Durable storage for the note collection.
//!
//! The whole collection lives in a single JSON document under one key of a
//! [`DocumentStore`]. Every save rewrites the document in full.
use std::{
    collections::HashMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use log::{debug, error, info, trace, warn};
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::{migrate_all, now, Note, NoteRecord, Result, ScribeError};

/// Default key the collection is stored under
pub const DEFAULT_STORE_KEY: &str = "scribe-notes";

/// A persistent key-value store holding whole documents.
pub trait DocumentStore: Send {
    /// Returns the stored document, or `None` if the key was never written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the document stored under `key`
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Stores every key as `<dir>/<key>.json`, replacing files atomically.
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    dir: PathBuf,
}

impl FileDocumentStore {
    /// Opens a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.exists() {
            debug!("Data directory does not exist, creating: {}", dir.display());
            fs::create_dir_all(&dir).map_err(|e| {
                error!("Failed to create data directory: {}", e);
                ScribeError::DirectoryError { path: dir.clone() }
            })?;
        }
        Ok(Self { dir })
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl DocumentStore for FileDocumentStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            trace!("No document at {}", path.display());
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| {
            error!("Failed to read document {}: {}", path.display(), e);
            ScribeError::Io(e)
        })?;
        Ok(Some(content))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let file_path = self.path_for(key);

        // Temporary file in the same directory so the rename stays atomic
        let dir = file_path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| {
            error!("Failed to create temporary file: {}", e);
            ScribeError::Io(e)
        })?;

        temp_file.write_all(value.as_bytes()).map_err(|e| {
            error!("Failed to write to temporary file: {}", e);
            ScribeError::Io(e)
        })?;
        temp_file.flush()?;

        temp_file.persist(&file_path).map_err(|e| {
            error!(
                "Failed to persist file {}: {}",
                file_path.display(),
                e.error
            );
            ScribeError::Io(e.error)
        })?;

        trace!("Wrote {} bytes to {}", value.len(), file_path.display());
        Ok(())
    }
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a value without going through the trait
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| ScribeError::LockAcquisitionFailed {
                message: "Failed to acquire lock on memory store".to_string(),
            })?;
        Ok(entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ScribeError::LockAcquisitionFailed {
                message: "Failed to acquire lock on memory store".to_string(),
            })?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Loads and saves the note collection as one document.
pub struct PersistenceAdapter {
    store: Box<dyn DocumentStore>,
    key: String,
}

impl PersistenceAdapter {
    pub fn new(store: Box<dyn DocumentStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Reads the stored collection, migrating older records.
    ///
    /// An absent document is an empty collection. An unreadable or corrupt
    /// document is logged and also yields an empty collection; the stored
    /// value is not touched.
    pub fn load(&self) -> Vec<Note> {
        match self.try_load() {
            Ok(notes) => {
                info!("Loaded {} notes from '{}'", notes.len(), self.key);
                notes
            }
            Err(e) => {
                error!("Failed to load notes from '{}': {}", self.key, e);
                Vec::new()
            }
        }
    }

    fn try_load(&self) -> Result<Vec<Note>> {
        let Some(document) = self.store.get(&self.key)? else {
            debug!("No stored document under '{}'", self.key);
            return Ok(Vec::new());
        };

        let root: Value =
            serde_json::from_str(&document).map_err(|e| ScribeError::LoadCorruption {
                message: e.to_string(),
            })?;
        let Value::Array(elements) = root else {
            return Err(ScribeError::LoadCorruption {
                message: "stored document is not an array".to_string(),
            });
        };

        // Records are migrated one by one so a single bad record cannot
        // empty the collection.
        let total = elements.len();
        let records: Vec<NoteRecord> = elements
            .iter()
            .filter_map(NoteRecord::from_value)
            .collect();
        if records.len() != total {
            warn!("Skipped {} unusable stored records", total - records.len());
        }

        Ok(migrate_all(records, now()))
    }

    /// Overwrites the stored document with `notes`
    pub fn save(&mut self, notes: &[Note]) -> Result<()> {
        let json = serde_json::to_string(notes).map_err(|e| {
            error!("Failed to serialize notes: {}", e);
            ScribeError::Serialization(e)
        })?;

        self.store.set(&self.key, &json).map_err(|e| {
            warn!("Failed to save notes under '{}': {}", self.key, e);
            e
        })?;

        debug!("Saved {} notes under '{}'", notes.len(), self.key);
        Ok(())
    }
}

/// Store whose writes fail on the listed call numbers (0-based)
#[cfg(test)]
pub(crate) struct FlakyDocumentStore {
    pub inner: MemoryDocumentStore,
    pub failing_writes: Vec<usize>,
    pub writes: usize,
}

#[cfg(test)]
impl FlakyDocumentStore {
    pub fn new(failing_writes: Vec<usize>) -> Self {
        Self {
            inner: MemoryDocumentStore::new(),
            failing_writes,
            writes: 0,
        }
    }
}

#[cfg(test)]
impl DocumentStore for FlakyDocumentStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let call = self.writes;
        self.writes += 1;
        if self.failing_writes.contains(&call) {
            return Err(ScribeError::Io(std::io::Error::other("disk full")));
        }
        self.inner.set(key, value)
    }
}
