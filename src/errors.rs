//! Error types for the scribenotes application.
//!
//! This module defines custom error types that categorize different failures
//! that can occur during note management operations.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the scribenotes application.
#[derive(Error, Debug)]
pub enum ScribeError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The persisted collection could not be parsed.
    #[error("Stored notes are corrupt: {message}")]
    LoadCorruption { message: String },

    /// An imported document parsed but does not have the note collection shape.
    #[error("Invalid import file: {message}")]
    ImportValidation { message: String },

    /// An imported document is not valid JSON.
    #[error("Import file is not valid JSON: {message}")]
    ImportParse { message: String },

    /// Note was not found when performing an operation.
    #[error("Note not found: {id}")]
    NoteNotFound { id: String },

    /// A note has no version at the requested position.
    #[error("Note {id} has no version #{index}")]
    VersionNotFound { id: String, index: usize },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    /// for mutex lock acquisition issues
    #[error("{message}")]
    LockAcquisitionFailed { message: String },

    #[error("{message}")]
    EditorError { message: String },

    /// A background task stopped or panicked.
    #[error("{message}")]
    TaskFailed { message: String },
}

impl ScribeError {
    /// True for the two failures an import can report to the user.
    pub fn is_import_failure(&self) -> bool {
        matches!(
            self,
            ScribeError::ImportValidation { .. } | ScribeError::ImportParse { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_failures_are_classified() {
        let validation = ScribeError::ImportValidation {
            message: "root is not an array".to_string(),
        };
        let parse = ScribeError::ImportParse {
            message: "expected value".to_string(),
        };
        assert!(validation.is_import_failure());
        assert!(parse.is_import_failure());
        assert!(!ScribeError::NoteNotFound { id: "1".to_string() }.is_import_failure());
    }

    #[test]
    fn test_version_not_found_display() {
        let err = ScribeError::VersionNotFound {
            id: "1700000000000".to_string(),
            index: 3,
        };
        assert_eq!(err.to_string(), "Note 1700000000000 has no version #3");
    }
}
