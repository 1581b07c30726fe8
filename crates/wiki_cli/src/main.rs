//! `wiki` command-line entry point.
//!
//! # Responsibility
//! - Load configuration, start logging and open the database.
//! - Dispatch one subcommand against `wiki_core` and print its JSON result.

mod args;

use anyhow::{Context, Result};
use args::{Cli, Command};
use clap::Parser;
use log::info;
use serde::Serialize;
use std::path::Path;
use wiki_core::api;
use wiki_core::db::{open_db, open_db_in_memory};
use wiki_core::import::tiddler::{import_tiddlers, load_tiddlers, ImportOptions};
use wiki_core::{ArticleService, SqliteArticleRepository, WikiConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match cli.config.as_deref() {
        Some(path) => WikiConfig::load(path)?,
        None => WikiConfig::default(),
    };

    wiki_core::init_logging_from_config(&config.logging)
        .map_err(anyhow::Error::msg)
        .context("failed to initialize logging")?;

    let db_path = cli.db.clone().or_else(|| config.database.path.clone());
    let db_path = db_path.as_deref();

    match cli.command {
        Command::Ping => {
            println!("wiki_core ping={}", wiki_core::ping());
            println!("wiki_core version={}", wiki_core::core_version());
            Ok(())
        }
        Command::Import {
            file,
            namespace,
            skip,
        } => with_repo(db_path, |mut repo| {
            let tiddlers = load_tiddlers(&file)?;
            let options = ImportOptions {
                namespace,
                skip_titles: skip.into_iter().collect(),
            };
            let report = import_tiddlers(&mut repo, &tiddlers, &options)?;
            info!(
                "event=cli_import module=cli status=ok imported={} skipped={}",
                report.imported.len(),
                report.skipped.len()
            );
            for title in &report.imported {
                println!("imported {title}");
            }
            for skipped in &report.skipped {
                println!("skipped {}: {}", skipped.title, skipped.reason);
            }
            Ok(())
        }),
        Command::Previews { actor } => with_repo(db_path, |repo| {
            let service = ArticleService::new(repo, config.permission_resolver());
            print_json(&api::list_previews(&service, actor.as_deref()))
        }),
        Command::Get { locator, actor } => with_repo(db_path, |repo| {
            let service = ArticleService::new(repo, config.permission_resolver());
            print_json(&api::get_article(&service, actor.as_deref(), &locator))
        }),
        Command::Create { body, actor } => with_repo(db_path, |repo| {
            let mut service = ArticleService::new(repo, config.permission_resolver());
            print_json(&api::create_article(&mut service, actor.as_deref(), &body))
        }),
        Command::Update {
            locator,
            body,
            actor,
        } => with_repo(db_path, |repo| {
            let mut service = ArticleService::new(repo, config.permission_resolver());
            print_json(&api::update_article(
                &mut service,
                actor.as_deref(),
                &locator,
                &body,
            ))
        }),
    }
}

/// Opens the store (in memory when `path` is `None`) and runs `command`.
fn with_repo<F>(path: Option<&Path>, command: F) -> Result<()>
where
    F: FnOnce(SqliteArticleRepository<'_>) -> Result<()>,
{
    let mut conn = match path {
        Some(path) => open_db(path)
            .with_context(|| format!("failed to open database `{}`", path.display()))?,
        None => open_db_in_memory().context("failed to open in-memory database")?,
    };
    let repo = SqliteArticleRepository::try_new(&mut conn)?;
    command(repo)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
