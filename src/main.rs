use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use scribenotes::{
    App, Cli, Config, FileDocumentStore, NoteStore, PersistenceAdapter, Result, SharedNoteStore,
    ViewState,
};

pub fn initialize_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    info!("Logger initialized");
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.unwrap_or_else(Config::default_path);
    let mut config = Config::load(&config_path)?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let documents = FileDocumentStore::open(&config.data_dir)?;
    let persistence = PersistenceAdapter::new(Box::new(documents), config.store_key.clone());
    let mut store = NoteStore::open(persistence);
    let view = ViewState::attach(&mut store);

    let mut app = App::new(
        SharedNoteStore::new(store),
        view,
        config,
        config_path,
        cli.verbose,
    );
    app.run(cli.command).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    info!("Application starting up");
    match run(cli).await {
        Ok(()) => {
            info!("Application shutting down");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
