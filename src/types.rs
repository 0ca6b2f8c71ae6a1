//! Shared types for the scribenotes application.
//!
//! This module contains the crate-wide Result alias and the CLI subcommands.
use std::path::PathBuf;

use clap::Subcommand;

use crate::ScribeError;

/// A specialized Result type for scribenotes operations.
pub type Result<T> = std::result::Result<T, ScribeError>;

/// Available subcommands for the scribenotes application
#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note
    New {
        /// Title of the note
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// Content of the note
        #[clap(short, long)]
        content: Option<String>,

        /// Open content in editor before saving
        #[clap(short, long)]
        edit: bool,

        /// Tags to associate with the note (comma-separated)
        #[clap(short = 't', long)]
        tags: Option<String>,
    },

    /// List notes with optional filtering
    List {
        /// Filter notes by tag
        #[clap(short, long)]
        tag: Option<String>,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// View a note by ID
    Show {
        /// ID of the note to view
        id: String,

        /// Format output as raw JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Edit an existing note
    Edit {
        /// ID of the note to edit
        id: String,

        /// New title for the note
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// New content for the note
        #[clap(short, long)]
        content: Option<String>,

        /// Open content in editor before saving
        #[clap(short, long)]
        edit: bool,
    },

    /// Delete a note by ID
    Delete {
        /// ID of the note to delete
        id: String,
    },

    /// Add or remove tags
    Tag {
        /// ID of the note to modify
        id: String,

        /// Tags to add (comma-separated)
        #[clap(short, long)]
        add: Option<String>,

        /// Tags to remove (comma-separated)
        #[clap(short, long)]
        remove: Option<String>,
    },

    /// Search notes by title, content or tag
    Search {
        /// Search query text
        query: String,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Version history operations
    #[clap(subcommand)]
    Version(VersionCommands),

    /// Export all notes to scribe-notes-export.json
    Export {
        /// Directory to write the export into (default uses config setting)
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace all notes with the contents of an export file
    Import {
        /// Path to the export file
        file: PathBuf,
    },

    /// Feed completed transcriptions (reads lines from stdin when none are given)
    Transcribe {
        /// Transcribed texts, in delivery order
        texts: Vec<String>,
    },

    /// Configuration management
    Config {
        /// Show current configuration
        #[clap(short = 'S', long)]
        show: bool,

        /// Update a configuration setting (key=value)
        #[clap(short, long)]
        set: Option<String>,

        /// Reset configuration to defaults
        #[clap(short, long)]
        reset: bool,
    },
}

/// Version history subcommands
#[derive(Subcommand)]
pub enum VersionCommands {
    /// Snapshot the note's current content
    Save {
        /// ID of the note
        id: String,

        /// Label for the snapshot
        #[clap(short, long, default_value = "")]
        description: String,
    },

    /// List a note's snapshots, oldest first
    List {
        /// ID of the note
        id: String,
    },

    /// Replace the note's content with a snapshot
    Restore {
        /// ID of the note
        id: String,

        /// Position of the snapshot as shown by `version list`
        index: usize,
    },
}
