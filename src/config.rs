use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use which::which;

use crate::{Result, ScribeError, DEFAULT_STORE_KEY, DEFAULT_TRANSCRIPTION_TITLE};

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the note document
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory exports are written to
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    /// Key the collection is stored under
    #[serde(default = "default_store_key")]
    pub store_key: String,

    /// Title for notes created from transcriptions
    #[serde(default = "default_transcription_title")]
    pub transcription_title: String,

    /// Default editor command
    #[serde(default)]
    pub editor_command: Option<String>,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "scribenotes")
}

fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".scribenotes"))
}

fn default_export_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_store_key() -> String {
    DEFAULT_STORE_KEY.to_string()
}

fn default_transcription_title() -> String {
    DEFAULT_TRANSCRIPTION_TITLE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            export_dir: default_export_dir(),
            store_key: default_store_key(),
            transcription_title: default_transcription_title(),
            editor_command: None,
        }
    }
}

impl Config {
    /// Where the config file lives when no path is given
    pub fn default_path() -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("scribenotes.json"))
    }

    /// Reads a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content).map_err(|e| ScribeError::ConfigError {
            message: format!("{}: {}", path.display(), e),
        })?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Writes the config as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|_| ScribeError::DirectoryError {
                    path: parent.to_path_buf(),
                })?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Applies a `key=value` setting
    pub fn set(&mut self, setting: &str) -> Result<()> {
        let (key, value) = setting
            .split_once('=')
            .ok_or_else(|| ScribeError::ConfigError {
                message: format!("expected key=value, got '{}'", setting),
            })?;
        let value = value.trim();

        match key.trim() {
            "data_dir" => self.data_dir = PathBuf::from(value),
            "export_dir" => self.export_dir = PathBuf::from(value),
            "store_key" if !value.is_empty() => self.store_key = value.to_string(),
            "transcription_title" => self.transcription_title = value.to_string(),
            "editor_command" if value.is_empty() => self.editor_command = None,
            "editor_command" => self.editor_command = Some(value.to_string()),
            other => {
                return Err(ScribeError::ConfigError {
                    message: format!("unknown or empty setting '{}'", other),
                })
            }
        }
        Ok(())
    }

    // This method provides smart fallbacks when no editor is configured
    pub fn get_editor_command(&self) -> String {
        if let Some(editor) = &self.editor_command {
            return editor.clone();
        }

        if let Ok(editor) = std::env::var("EDITOR") {
            return editor;
        }

        if cfg!(windows) {
            "notepad".to_string()
        } else {
            for editor in &["nano", "vim", "vi"] {
                if which(editor).is_ok() {
                    return editor.to_string();
                }
            }
            "nano".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(&temp_dir.path().join("config.json")).unwrap();
        assert_eq!(config.store_key, "scribe-notes");
        assert_eq!(config.transcription_title, "Voice Note");
    }

    #[test]
    fn test_partial_file_defaults_per_field() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{"store_key": "custom"}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.store_key, "custom");
        assert_eq!(config.transcription_title, "Voice Note");
    }

    #[test]
    fn test_config_persistence() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.set("data_dir=/tmp/notes").unwrap();
        config.set("editor_command = vim").unwrap();
        config.save(&path).unwrap();

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded, config);
        assert_eq!(reloaded.get_editor_command(), "vim");
    }

    #[test]
    fn test_invalid_config_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            Config::load(&path),
            Err(ScribeError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_set_rejects_unknown_keys() {
        let mut config = Config::default();
        assert!(config.set("colour=red").is_err());
        assert!(config.set("store_key=").is_err());
        assert!(config.set("no-equals").is_err());
    }
}
