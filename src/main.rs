use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use ccview::cli::{projects, search, sessions, show, trash};
use ccview::config::Config;
use ccview::{Scanner, SearchEngine, TrashStore};

#[derive(Parser)]
#[command(name = "ccview")]
#[command(about = "Browse, search and soft-delete Claude Code session logs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "ccview.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// List projects by recent activity
    Projects,

    /// List the sessions of one project
    Sessions {
        /// Project directory name (encoded path)
        project_id: String,
    },

    /// Show a session's messages
    Show {
        project_id: String,
        session_id: String,

        /// Include thinking, tool results, and content-less messages
        #[arg(long)]
        full: bool,
    },

    /// Search all session logs for a keyword
    Search {
        keyword: String,

        /// Restrict to one project
        #[arg(short, long)]
        project: Option<String>,

        /// Only sessions modified on or after this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Only sessions modified on or before this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Trash management
    Trash {
        #[command(subcommand)]
        command: TrashCommands,
    },
}

#[derive(Subcommand)]
enum TrashCommands {
    /// List trashed sessions
    List,
    /// Move a session to the trash
    Put {
        project_id: String,
        session_id: String,
    },
    /// Restore a trashed session to its project
    Restore {
        project_id: String,
        session_id: String,
    },
    /// Permanently delete one trashed session
    Delete {
        project_id: String,
        session_id: String,
    },
    /// Permanently delete everything in the trash
    Empty,
    /// Remove expired items now
    Clean,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    // Load config
    let config = Config::load(&cli.config).unwrap_or_default();

    let trash_store = Arc::new(TrashStore::new(
        config.logs_root(),
        config.trash_root(),
        config.retention_days(),
    ));

    // Best-effort expiry sweep after startup: detached, never joined, never
    // affects the command's outcome. `trash clean` does the same job
    // synchronously when it matters.
    let explicit_clean = matches!(
        &cli.command,
        Commands::Trash {
            command: TrashCommands::Clean
        }
    );
    if !explicit_clean {
        let sweep_store = Arc::clone(&trash_store);
        std::thread::spawn(move || {
            if let Err(e) = sweep_store.cleanup_expired() {
                warn!(error = %e, "background expiry sweep failed");
            }
        });
    }

    match cli.command {
        Commands::Projects => {
            projects::run(&Scanner::new(config.logs_root()))?;
        }
        Commands::Sessions { project_id } => {
            sessions::run(&Scanner::new(config.logs_root()), &project_id)?;
        }
        Commands::Show {
            project_id,
            session_id,
            full,
        } => {
            show::run(&config.logs_root(), &project_id, &session_id, full)?;
        }
        Commands::Search {
            keyword,
            project,
            from,
            to,
        } => {
            search::run(
                &SearchEngine::new(config.logs_root()),
                &keyword,
                project,
                from,
                to,
            )?;
        }
        Commands::Trash { command } => match command {
            TrashCommands::List => trash::list(&trash_store)?,
            TrashCommands::Put {
                project_id,
                session_id,
            } => trash::put(&trash_store, &project_id, &session_id)?,
            TrashCommands::Restore {
                project_id,
                session_id,
            } => trash::restore(&trash_store, &project_id, &session_id)?,
            TrashCommands::Delete {
                project_id,
                session_id,
            } => trash::delete(&trash_store, &project_id, &session_id)?,
            TrashCommands::Empty => trash::empty(&trash_store)?,
            TrashCommands::Clean => trash::clean(&trash_store)?,
        },
    }

    Ok(())
}
