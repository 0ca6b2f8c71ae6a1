//! Import and export of the full note collection.
//!
//! An export is the pretty-printed JSON array of every note, version history
//! included. An import is all-or-nothing: one bad record rejects the file.
use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, error, info, warn};
use serde_json::Value;

use crate::{migrate_all, now, Note, NoteRecord, NoteStore, Result, ScribeError};

/// Fixed name of the downloadable export
pub const EXPORT_FILE_NAME: &str = "scribe-notes-export.json";

/// Fields every imported record must carry
const REQUIRED_FIELDS: [&str; 3] = ["id", "title", "content"];

/// Serializes the collection for download
pub fn export(notes: &[Note]) -> Result<String> {
    Ok(serde_json::to_string_pretty(notes)?)
}

/// Writes the export document into `dir` under [`EXPORT_FILE_NAME`]
pub fn export_to_dir(notes: &[Note], dir: &Path) -> Result<PathBuf> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| {
            error!("Failed to create export directory: {}", e);
            ScribeError::DirectoryError {
                path: dir.to_path_buf(),
            }
        })?;
    }

    let path = dir.join(EXPORT_FILE_NAME);
    fs::write(&path, export(notes)?)?;

    info!("Exported {} notes to {}", notes.len(), path.display());
    Ok(path)
}

/// Parses and validates an uploaded document into a collection.
pub fn import(document: &str) -> Result<Vec<Note>> {
    let root: Value = serde_json::from_str(document).map_err(|e| {
        error!("Import document is not valid JSON: {}", e);
        ScribeError::ImportParse {
            message: e.to_string(),
        }
    })?;

    let Value::Array(elements) = &root else {
        return Err(invalid("expected an array of notes"));
    };

    for (index, element) in elements.iter().enumerate() {
        validate_record(index, element)?;
    }

    let records: Vec<NoteRecord> = serde_json::from_value(root).map_err(|e| {
        warn!("Import document has malformed fields: {}", e);
        invalid(e.to_string())
    })?;

    let notes = migrate_all(records, now());
    debug!("Import document accepted with {} notes", notes.len());
    Ok(notes)
}

/// Reads an uploaded file, suspending until its bytes are available
pub async fn read_import_file(path: &Path) -> Result<String> {
    debug!("Reading import file {}", path.display());
    tokio::fs::read_to_string(path).await.map_err(|e| {
        error!("Failed to read import file {}: {}", path.display(), e);
        ScribeError::Io(e)
    })
}

fn validate_record(index: usize, element: &Value) -> Result<()> {
    let Some(record) = element.as_object() else {
        return Err(invalid(format!("note #{} is not an object", index)));
    };

    for field in REQUIRED_FIELDS {
        if !record.contains_key(field) {
            return Err(invalid(format!("note #{} is missing '{}'", index, field)));
        }
    }

    match &record["id"] {
        Value::String(id) if !id.is_empty() => {}
        Value::Number(_) => {}
        _ => return Err(invalid(format!("note #{} has an invalid id", index))),
    }

    for field in ["title", "content"] {
        if !record[field].is_string() {
            return Err(invalid(format!("note #{} has a non-text '{}'", index, field)));
        }
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> ScribeError {
    ScribeError::ImportValidation {
        message: message.into(),
    }
}

impl NoteStore {
    /// Replaces the collection with an imported document.
    ///
    /// On failure the collection is left exactly as it was.
    pub fn import_document(&mut self, document: &str) -> Result<usize> {
        let notes = import(document)?;
        let count = notes.len();
        self.replace_all(notes)?;
        Ok(count)
    }
}
