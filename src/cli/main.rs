use std::path::PathBuf;

use clap::Parser;

use crate::Commands;

/// Main CLI application arguments and command structure
#[derive(Parser)]
#[clap(
    version,
    about = "Notes from typing or dictation, with history, tags and backups"
)]
pub struct Cli {
    /// Path to the configuration file
    #[clap(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Directory holding the note document (overrides the config file)
    #[clap(long, value_parser)]
    pub data_dir: Option<PathBuf>,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands for the scribenotes application
    #[clap(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VersionCommands;

    #[test]
    fn test_parses_version_restore() {
        let cli = Cli::parse_from([
            "scribenotes",
            "--data-dir",
            "/tmp/x",
            "version",
            "restore",
            "17",
            "0",
        ]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        match cli.command {
            Commands::Version(VersionCommands::Restore { id, index }) => {
                assert_eq!(id, "17");
                assert_eq!(index, 0);
            }
            _ => panic!("expected version restore"),
        }
    }

    #[test]
    fn test_parses_transcribe_texts() {
        let cli = Cli::parse_from(["scribenotes", "transcribe", "hello", "hello"]);
        match cli.command {
            Commands::Transcribe { texts } => assert_eq!(texts, vec!["hello", "hello"]),
            _ => panic!("expected transcribe"),
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
