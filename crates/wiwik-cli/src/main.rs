//! wiwik CLI
//!
//! Compose forum posts with `@mention` autocomplete in the terminal, or look
//! users up and manage settings from scripts.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use wiwik_cli::app::{App, AppOptions, page_url};
use wiwik_cli::backend::Backend;
use wiwik_cli::headless::{self, ThemeAction};
use wiwik_cli::tui;
use wiwik_core::config;
use wiwik_core::search::SearchQuery;
use wiwik_core::storage::{JsonFileStore, KeyValueStore, MemoryStore};
use wiwik_core::tracing_init::{init_file_tracing, init_tracing};

#[derive(Parser, Debug)]
#[command(name = "wiwik")]
#[command(version, about = "wiwik forum composer with @mention autocomplete", long_about = None)]
struct Cli {
    /// Forum base URL (overrides the config file)
    #[arg(long, global = true, env = "WIWIK_SERVER_URL")]
    server_url: Option<String>,

    /// Search a local user directory instead of the forum
    #[arg(long, global = true)]
    offline: bool,

    /// JSON user directory for offline mode (defaults to bundled sample users)
    #[arg(long, global = true, value_name = "FILE")]
    directory: Option<PathBuf>,

    /// Your username; left out of offline search results
    #[arg(long, global = true, env = "WIWIK_USER")]
    user: Option<String>,

    /// Question being answered (enables invites in the composer)
    #[arg(short, long)]
    question: Option<u64>,

    /// Emit JSON log lines (headless commands)
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search users the way the mention menu does.
    Search {
        /// Text typed after the trigger.
        query: String,
        /// Usernames to leave out (comma separated).
        #[arg(long, value_delimiter = ',')]
        selected: Vec<String>,
        /// Print raw JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Invite users to answer a question.
    Invite {
        /// Question ID.
        #[arg(short, long)]
        question: u64,
        /// Usernames to invite.
        #[arg(required = true)]
        usernames: Vec<String>,
    },
    /// Show or change the colour theme.
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = config::load_config()?;
    if let Some(url) = &cli.server_url {
        config.server.base_url.clone_from(url);
    }
    config::validate(&config)?;

    // The TUI logs to a file so the terminal stays clean.
    let filter = format!(
        "wiwik={0},wiwik_cli={0},wiwik_core={0}",
        config.server.log_level
    );
    if cli.command.is_some() {
        init_tracing(&filter, cli.log_json);
    } else if let Some(dir) = config::state_dir() {
        let log_path = dir.join("wiwik.log");
        if let Err(e) = init_file_tracing(&filter, &log_path) {
            writeln!(io::stderr(), "Logging disabled: {e}")?;
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "Starting wiwik CLI");

    let backend = Backend::from_config(
        &config,
        cli.offline,
        cli.directory.as_deref(),
        cli.user.as_deref(),
    )?;
    let mut out = io::stdout();

    match cli.command {
        Some(Commands::Search {
            query,
            selected,
            json,
        }) => {
            let query = SearchQuery::new(query).with_selected(selected);
            headless::run_search(&backend, &query, json, &mut out).await
        }
        Some(Commands::Invite {
            question,
            usernames,
        }) => headless::run_invite(&backend, question, &usernames, &mut out).await,
        Some(Commands::Theme { action }) => {
            let mut store = open_store();
            headless::run_theme(&mut store, action.unwrap_or(ThemeAction::Show), &mut out)
        }
        None => {
            let options = AppOptions {
                question_id: cli.question,
                page_url: page_url(&config.server.base_url, cli.question),
                offline: backend.is_offline(),
            };
            let app = App::new(&config, open_store(), options);
            tui::run(backend, app).await
        }
    }
}

/// Persistent storage, or a volatile one when the state file is unusable.
fn open_store() -> Box<dyn KeyValueStore + Send> {
    let Some(path) = JsonFileStore::default_path() else {
        warn!("No home directory; settings will not persist");
        return Box::new(MemoryStore::new());
    };
    match JsonFileStore::open(path.clone()) {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!(error = %e, path = %path.display(), "Using in-memory settings");
            Box::new(MemoryStore::new())
        }
    }
}
