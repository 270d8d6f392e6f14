#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use chatmem_common::logging::init_logging;
use chatmem_common::Config;

mod backend;
mod chat;
mod faq;

/// chatmem - short-term conversational memory and FAQ search.
#[derive(Parser, Debug)]
#[command(name = "chatmem")]
#[command(version = "0.1.0")]
#[command(about = "Short-term conversational memory over Redis, with hybrid FAQ search.", long_about = None)]
struct Cli {
    /// Config file (default: ~/.chatmem/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Keep session history in process memory instead of Redis
    /// (`chat` and `check-config` only; the history ends with the process)
    #[arg(long, global = true)]
    in_memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive loop printing the contextual message for each line
    Chat {
        /// Resume an existing session instead of starting a new one
        #[arg(long)]
        session: Option<String>,
    },

    /// Print the rendered history of a session
    History {
        /// Session key (user_<id>_<YYYYMMDD_HHMM>)
        session_key: String,

        /// Print raw records, most recent first
        #[arg(long)]
        raw: bool,
    },

    /// Delete every stored message of a session
    Clear {
        /// Session key
        session_key: String,
    },

    /// Load FAQ rows from a JSON file into the dense and keyword indexes
    Index {
        /// JSON array of {"Question": ..., "Answer": ...} objects
        rows: PathBuf,
    },

    /// Hybrid FAQ search
    Search {
        /// Query text
        query: String,

        /// Search answer text instead of question text
        #[arg(long)]
        answers: bool,

        /// Maximum number of results (default from config)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration and check backend connectivity
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_with_env(cli.config.as_deref()).context("Failed to load config")?;
    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    match cli.command {
        Commands::Chat { session } => chat::run(&config, cli.in_memory, session).await,
        Commands::History { session_key, raw } => {
            require_persistent_store("history", cli.in_memory)?;
            chat::history(&config, &session_key, raw).await
        }
        Commands::Clear { session_key } => {
            require_persistent_store("clear", cli.in_memory)?;
            chat::clear(&config, &session_key).await
        }
        Commands::Index { rows } => faq::index(&config, &rows).await,
        Commands::Search {
            query,
            answers,
            limit,
            json,
        } => faq::search(&config, &query, answers, limit, json).await,
        Commands::CheckConfig => check_config(&config, cli.in_memory).await,
    }
}

async fn check_config(config: &Config, in_memory: bool) -> Result<()> {
    match config.validate() {
        Ok(()) => println!("Configuration: ok"),
        Err(e) => {
            println!("Configuration: invalid");
            println!("  {e}");
            anyhow::bail!("configuration is invalid");
        }
    }

    let store_ok = match backend::list_store(config, in_memory).await {
        Ok(store) => store.health_check().await,
        Err(e) => {
            tracing::warn!(error = %e, "Session store unavailable");
            false
        }
    };
    println!(
        "Session store ({}): {}",
        if in_memory { "memory" } else { "redis" },
        status(store_ok)
    );

    match backend::search_parts(config).await {
        Ok(parts) => {
            let (dense_ok, keyword_ok) = parts.searcher(config).health_check().await;
            println!("Vector index (qdrant): {}", status(dense_ok));
            println!("Keyword index (sqlite): {}", status(keyword_ok));
        }
        Err(e) => {
            tracing::warn!(error = %e, "Search backends unavailable");
            println!("Search backends: unavailable ({e})");
        }
    }

    Ok(())
}

/// Commands that act on an existing session need a store that outlives the
/// process.
fn require_persistent_store(command: &str, in_memory: bool) -> Result<()> {
    if in_memory {
        anyhow::bail!(
            "--in-memory only applies to `chat` and `check-config`; `{command}` reads sessions from Redis"
        );
    }
    Ok(())
}

fn status(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "unreachable"
    }
}
