//! Version history for notes.
//!
//! Snapshots are appended, never edited or removed. Restoring copies a
//! snapshot's content back into the live note without touching the history.
use log::{debug, info};

use crate::{now, NoteStore, NoteVersion, Result, ScribeError};

impl NoteStore {
    /// Appends a snapshot of the note's current content.
    ///
    /// Returns false, without writing anything, when the note does not exist.
    pub fn save_version(&mut self, id: &str, description: &str) -> Result<bool> {
        let Some(mut note) = self.get(id).cloned() else {
            debug!("save_version: note {} not found", id);
            return Ok(false);
        };

        note.versions.push(NoteVersion {
            content: note.content.clone(),
            timestamp: now(),
            description: description.to_string(),
        });
        let count = note.versions.len();
        self.update(note)?;

        info!("Saved version #{} of note {}: {}", count, id, description);
        Ok(true)
    }

    /// Replaces the note's live content with `version`'s content.
    ///
    /// No new snapshot is taken, so unsaved live content is lost. Returns
    /// false when the note does not exist.
    pub fn restore_version(&mut self, id: &str, version: &NoteVersion) -> Result<bool> {
        let Some(mut note) = self.get(id).cloned() else {
            debug!("restore_version: note {} not found", id);
            return Ok(false);
        };

        note.content = version.content.clone();
        self.update(note)?;

        info!(
            "Restored note {} to version '{}' from {}",
            id,
            version.description,
            version.timestamp.format("%Y-%m-%d %H:%M:%S")
        );
        Ok(true)
    }

    /// Restores the version at `index` (0 is the oldest)
    pub fn restore_version_at(&mut self, id: &str, index: usize) -> Result<()> {
        let version = self
            .require(id)?
            .versions
            .get(index)
            .cloned()
            .ok_or_else(|| ScribeError::VersionNotFound {
                id: id.to_string(),
                index,
            })?;
        self.restore_version(id, &version)?;
        Ok(())
    }

    /// History of a note, oldest first
    pub fn versions(&self, id: &str) -> Option<&[NoteVersion]> {
        self.get(id).map(|n| n.versions.as_slice())
    }
}
