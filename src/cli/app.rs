//! CLI module for the scribenotes application
//!
//! This module handles the command-line interface for interacting with the
//! note store.
use std::{
    fs::{read_to_string, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    process::Command,
    sync::{Arc, Mutex},
};

use log::{debug, info};
use shell_words::split;
use tempfile::Builder;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    codec, content_preview, search, spawn_intake, Commands, Config, Note, Result, ScribeError,
    SharedNoteStore, TranscriptionIntake, VersionCommands, ViewState,
};

/// CLI Application handler - processes CLI commands and interfaces with the note store
pub struct App {
    /// The note store
    store: SharedNoteStore,

    /// Selection and visibility, kept in sync with the store
    view: Arc<Mutex<ViewState>>,

    /// Application configuration
    config: Config,

    /// Where `config` was read from
    config_path: PathBuf,

    /// Whether to display verbose output
    verbose: bool,
}

impl App {
    /// Create a new CLI application with the given store and config
    pub fn new(
        store: SharedNoteStore,
        view: Arc<Mutex<ViewState>>,
        config: Config,
        config_path: PathBuf,
        verbose: bool,
    ) -> Self {
        Self {
            store,
            view,
            config,
            config_path,
            verbose,
        }
    }

    /// Run the CLI application with the given command
    pub async fn run(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::New {
                title,
                content,
                edit,
                tags,
            } => self.create_note(title, content, tags, edit)?,

            Commands::List { tag, json } => self.list_notes(tag, json)?,

            Commands::Show { id, json } => self.show_note(&id, json)?,

            Commands::Edit {
                id,
                title,
                content,
                edit,
            } => self.edit_note(&id, title, content, edit)?,

            Commands::Delete { id } => self.delete_note(&id)?,

            Commands::Tag { id, add, remove } => self.tag_note(&id, add, remove)?,

            Commands::Search { query, json } => self.search_notes(&query, json)?,

            Commands::Version(command) => self.handle_version(command)?,

            Commands::Export { output } => self.export_notes(output)?,

            Commands::Import { file } => self.import_notes(&file).await?,

            Commands::Transcribe { texts } => self.transcribe(texts).await?,

            Commands::Config { show, set, reset } => self.handle_config(show, set, reset)?,
        }

        Ok(())
    }

    fn create_note(
        &self,
        title: Option<String>,
        content: Option<String>,
        tags: Option<String>,
        open_editor: bool,
    ) -> Result<()> {
        let title = title.unwrap_or_default();
        let content = match content {
            Some(c) => c,
            None if open_editor => self.open_editor_for_content(&title, "")?,
            None => String::new(),
        };

        let id = self
            .store
            .lock()?
            .create_with(title, content, crate::parse_tags(tags))?;

        println!("Note created with ID: {}", id);
        Ok(())
    }

    fn edit_note(
        &self,
        id: &str,
        title: Option<String>,
        content: Option<String>,
        open_editor: bool,
    ) -> Result<()> {
        let mut store = self.store.lock()?;
        let mut note = store.require(id)?.clone();

        if let Some(title) = title {
            note.title = title;
        }
        if let Some(content) = content {
            note.content = content;
        } else if open_editor {
            note.content = self.open_editor_for_content(&note.title, &note.content)?;
        }

        store.update(note)?;
        println!("Note {} updated", id);
        Ok(())
    }

    fn delete_note(&self, id: &str) -> Result<()> {
        let existed = {
            let mut store = self.store.lock()?;
            let existed = store.get(id).is_some();
            store.delete(id)?;
            existed
        };

        if existed {
            println!("Note {} deleted", id);
        } else {
            println!("No note with ID {}", id);
        }
        Ok(())
    }

    fn tag_note(&self, id: &str, add: Option<String>, remove: Option<String>) -> Result<()> {
        let mut store = self.store.lock()?;
        store.require(id)?;

        if let Some(tags) = add {
            store.add_tags(id, &tags)?;
        }
        if let Some(tags) = remove {
            store.remove_tags(id, &tags)?;
        }

        let note = store.require(id)?;
        if note.tags.is_empty() {
            println!("Note {} has no tags", id);
        } else {
            println!("Tags: {}", format_tags(&note.tags));
        }
        Ok(())
    }

    fn list_notes(&self, tag: Option<String>, json: bool) -> Result<()> {
        let store = self.store.lock()?;
        let notes = match tag {
            Some(tag) => search::filter_by_tag(store.notes(), &tag),
            None => store.notes().iter().collect(),
        };
        self.display_notes(&notes, json)
    }

    fn search_notes(&self, query: &str, json: bool) -> Result<()> {
        let store = self.store.lock()?;
        let matches = {
            let mut view = self.lock_view()?;
            view.set_search(query);
            view.visible_notes(store.notes())
        };
        info!("Search '{}' matched {} notes", query, matches.len());
        self.display_notes(&matches, json)
    }

    fn show_note(&self, id: &str, json: bool) -> Result<()> {
        let store = self.store.lock()?;
        let note = store.require(id)?;

        if json {
            println!("{}", serde_json::to_string_pretty(note)?);
            return Ok(());
        }

        print_header(note);
        println!("Versions: {}", note.versions.len());
        println!("Last edited: {}", note.last_edited.format("%Y-%m-%d %H:%M"));
        println!("\n{}", note.content);
        Ok(())
    }

    fn handle_version(&self, command: VersionCommands) -> Result<()> {
        let mut store = self.store.lock()?;

        match command {
            VersionCommands::Save { id, description } => {
                store.require(&id)?;
                store.save_version(&id, &description)?;
                let count = store.versions(&id).map_or(0, |v| v.len());
                println!("Saved version #{} of note {}", count - 1, id);
            }
            VersionCommands::List { id } => {
                let versions = store.require(&id)?.versions.as_slice();
                if versions.is_empty() {
                    println!("Note {} has no saved versions", id);
                }
                for (index, version) in versions.iter().enumerate() {
                    println!(
                        "#{} {} {} | {}",
                        index,
                        version.timestamp.format("%Y-%m-%d %H:%M:%S"),
                        console::style(&version.description).bold(),
                        content_preview(&version.content, 60)
                    );
                }
            }
            VersionCommands::Restore { id, index } => {
                store.restore_version_at(&id, index)?;
                println!("Note {} restored to version #{}", id, index);
            }
        }
        Ok(())
    }

    fn export_notes(&self, output: Option<PathBuf>) -> Result<()> {
        let dir = output.unwrap_or_else(|| self.config.export_dir.clone());
        let store = self.store.lock()?;
        let path = codec::export_to_dir(store.notes(), &dir)?;
        println!("Exported {} notes to {}", store.len(), path.display());
        Ok(())
    }

    async fn import_notes(&self, file: &Path) -> Result<()> {
        let document = codec::read_import_file(file).await?;

        match self.store.lock()?.import_document(&document) {
            Ok(count) => {
                println!("Imported {} notes from {}", count, file.display());
                Ok(())
            }
            Err(e) if e.is_import_failure() => {
                eprintln!(
                    "{}",
                    console::style(format!(
                        "Import of {} rejected, your notes were not changed.",
                        file.display()
                    ))
                    .red()
                    .bold()
                );
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    async fn transcribe(&self, texts: Vec<String>) -> Result<()> {
        let intake = TranscriptionIntake::new(self.config.transcription_title.clone());
        let handle = spawn_intake(self.store.clone(), intake, Arc::clone(&self.view));

        if texts.is_empty() {
            debug!("Reading transcriptions from stdin");
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                handle.deliver(line).await?;
            }
        } else {
            for text in texts {
                handle.deliver(text).await?;
            }
        }

        let (created, _) = handle.finish().await?;
        println!("Created {} note{}", created, if created == 1 { "" } else { "s" });

        if let Some(id) = self.lock_view()?.selected.clone() {
            println!("Selected note: {}", id);
        }
        Ok(())
    }

    fn handle_config(&mut self, show: bool, set: Option<String>, reset: bool) -> Result<()> {
        if reset {
            self.config = Config::default();
            self.config.save(&self.config_path)?;
            println!("Configuration reset to defaults");
        }

        if let Some(setting) = set {
            self.config.set(&setting)?;
            self.config.save(&self.config_path)?;
            println!("Configuration updated");
        }

        if show || self.verbose {
            println!("Config file: {}", self.config_path.display());
            println!("{}", serde_json::to_string_pretty(&self.config)?);
        }
        Ok(())
    }

    fn lock_view(&self) -> Result<std::sync::MutexGuard<'_, ViewState>> {
        self.view
            .lock()
            .map_err(|_| ScribeError::LockAcquisitionFailed {
                message: "Failed to acquire lock on view state".to_string(),
            })
    }

    fn display_notes(&self, notes: &[&Note], json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(notes)?);
            return Ok(());
        }

        if notes.is_empty() {
            println!("No notes found matching the criteria.");
            return Ok(());
        }

        // Use terminal width for formatting if available
        let term_width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80);

        for (i, note) in notes.iter().enumerate() {
            if i > 0 {
                println!("{}", "-".repeat(term_width.min(50)));
            }
            print_header(note);

            let preview = content_preview(&note.content, 100);
            if !preview.is_empty() {
                println!("\n{}", preview);
            }
        }

        println!(
            "\nFound {} note{}",
            notes.len(),
            if notes.len() == 1 { "" } else { "s" }
        );
        Ok(())
    }

    fn open_editor_for_content(&self, title: &str, initial: &str) -> Result<String> {
        let temp_file = Builder::new().suffix(".txt").tempfile()?;
        let temp_path = temp_file.path().to_path_buf();

        {
            let mut file = OpenOptions::new().write(true).open(&temp_path)?;
            file.write_all(initial.as_bytes())?;
        }

        let editor_cmd = self.config.get_editor_command();
        info!("Opening editor for '{}'. Save and exit when done...", title);
        self.launch_editor(&editor_cmd, &temp_path)?;

        Ok(read_to_string(&temp_path)?)
    }

    fn launch_editor(&self, editor_cmd: &str, file_path: &Path) -> Result<()> {
        let args = split(editor_cmd).map_err(|e| ScribeError::EditorError {
            message: format!("Failed to parse editor command: {}", e),
        })?;

        let Some((program, rest)) = args.split_first() else {
            return Err(ScribeError::EditorError {
                message: "Empty editor command".to_string(),
            });
        };

        let status = Command::new(program).args(rest).arg(file_path).status()?;
        if !status.success() {
            return Err(ScribeError::EditorError {
                message: "Editor exited with non-zero status".to_string(),
            });
        }
        Ok(())
    }
}

fn print_header(note: &Note) {
    let title = if note.title.is_empty() {
        "(untitled)"
    } else {
        note.title.as_str()
    };
    println!(
        "ID: {} | Created: {}",
        note.id,
        note.created.format("%Y-%m-%d %H:%M")
    );
    println!("Title: {}", console::style(title).bold());
    if !note.tags.is_empty() {
        println!("Tags: {}", console::style(format_tags(&note.tags)).cyan());
    }
}

fn format_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("#{}", tag))
        .collect::<Vec<_>>()
        .join(" ")
}
