//! Command-line entry point: list, read, edit and export a workspace's translations.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{
    Parser,
    Subcommand,
};
use thiserror::Error;
use translation_grid::EditorError;
use translation_grid::EditorSession;
use translation_grid::config::{
    ConfigError,
    ConfigManager,
    EditorSettings,
};
use translation_grid::storage::{
    FsStorage,
    StorageError,
};
use translation_grid::view::{
    SortColumn,
    SortDirection,
    SortSpec,
};

#[derive(Parser)]
#[command(name = "translation-grid")]
#[command(version)]
#[command(about = "View and edit per-language JSON translation files as one table")]
struct Cli {
    /// Workspace holding `.translation-grid.json` and the translation directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    workspace: PathBuf,

    /// Override `translationDir` from the settings file
    #[arg(long, value_name = "DIR", global = true)]
    translation_dir: Option<String>,

    /// Override `mainLanguage` from the settings file
    #[arg(long, value_name = "LANG", global = true)]
    main_language: Option<String>,

    /// Override `keySeparator` from the settings file
    #[arg(long, value_name = "SEP", global = true)]
    key_separator: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every key with its text in each language
    List {
        /// Keep keys whose name or text contains this (case-insensitive)
        #[arg(short, long, default_value = "")]
        filter: String,

        /// Sort by this language's text instead of by key
        #[arg(short, long, value_name = "LANG")]
        sort_language: Option<String>,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Print one translation
    Get {
        language: String,
        key: String,
    },

    /// Set one translation and save that key
    Set {
        language: String,
        key: String,
        value: String,
    },

    /// Print every language's tree as JSON
    Export,
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(writer)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config_manager = ConfigManager::new();
    config_manager.load_settings(Some(cli.workspace.clone()))?;
    if cli.translation_dir.is_some() || cli.main_language.is_some() || cli.key_separator.is_some() {
        let current = config_manager.get_settings().clone();
        config_manager.update_settings(EditorSettings {
            translation_dir: cli.translation_dir.unwrap_or(current.translation_dir),
            main_language: cli.main_language.unwrap_or(current.main_language),
            key_separator: cli.key_separator.unwrap_or(current.key_separator),
            ..current
        })?;
    }
    let settings = config_manager.get_settings();

    let storage = FsStorage::from_settings(&cli.workspace, settings)?;
    let session = EditorSession::open(storage, settings.codec()).await?;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Command::List { filter, sort_language, desc } => {
            let column = sort_language.map_or(SortColumn::Key, SortColumn::Language);
            let direction = if desc { SortDirection::Descending } else { SortDirection::Ascending };
            let rows = session.rows(&filter, &SortSpec::new(column, direction)).await;
            let languages: Vec<String> =
                session.lock().await.languages().into_iter().map(str::to_string).collect();

            writeln!(out, "key\t{}", languages.join("\t"))?;
            for row in rows {
                let cells: Vec<&str> = languages.iter().map(|lang| row.value(lang)).collect();
                writeln!(out, "{}\t{}", row.key, cells.join("\t"))?;
            }
        }
        Command::Get { language, key } => {
            writeln!(out, "{}", session.get_value(&language, &key).await)?;
        }
        Command::Set { language, key, value } => {
            session.set_value(&language, &key, value).await?;
            let cleared = session.save_key(&key).await?;
            tracing::info!(language = %language, key = %key, cleared, "Saved translation");
        }
        Command::Export => {
            let payload = session.lock().await.build_full_save_payload().map_err(EditorError::from)?;
            serde_json::to_writer_pretty(&mut out, &payload)?;
            writeln!(out)?;
        }
    }

    Ok(())
}
