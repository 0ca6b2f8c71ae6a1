//! Note-taking library for typed and dictated notes
//!
//! This library provides the note store with its persistence and migration
//! logic, version history, search, import/export, and the intake that turns
//! finished transcriptions into notes.

mod cli;
mod codec;
mod config;
mod errors;
mod helper;
mod intake;
mod note;
mod permission;
mod persistence;
pub mod search;
mod storage;
mod types;
mod versions;
mod view;

// Re-export key components
pub use cli::*;
pub use codec::{export, export_to_dir, import, read_import_file, EXPORT_FILE_NAME};
pub use config::*;
pub use errors::*;
pub use helper::*;
pub use intake::*;
pub use note::*;
pub use permission::*;
pub use persistence::*;
pub use storage::*;
pub use types::*;
pub use view::*;
