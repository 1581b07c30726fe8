//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//! - `--config <file>`: TOML configuration (database, logging, grants).
//! - `--db <file>`: SQLite file; overrides `[database].path`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// wiki - namespaced article store with per-namespace permissions
#[derive(Parser, Debug)]
#[command(name = "wiki")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file; an in-memory database is used when neither this nor
    /// the config names one
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print core health and version
    Ping,

    /// Import a TiddlyWiki JSON export into one namespace
    Import {
        /// Exported tiddlers file
        file: PathBuf,

        /// Target namespace
        #[arg(long)]
        namespace: String,

        /// Tiddler title to leave out (repeatable)
        #[arg(long = "skip", value_name = "TITLE")]
        skip: Vec<String>,
    },

    /// List previews of every readable article
    Previews {
        #[arg(long)]
        actor: Option<String>,
    },

    /// Show one article by `namespace/name`
    Get {
        locator: String,

        #[arg(long)]
        actor: Option<String>,
    },

    /// Create an article from a JSON body
    Create {
        /// `{"namespace":..,"id":..,"title":..,"text":..}`
        body: String,

        #[arg(long)]
        actor: Option<String>,
    },

    /// Replace the article at `namespace/name` with a JSON body
    Update {
        locator: String,

        body: String,

        #[arg(long)]
        actor: Option<String>,
    },
}
