// Command line interface for the sgcache binary.
// Parses arguments and runs maintenance commands against a store.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::store::{FileKvStore, KvStore, paths};
use crate::tk::{TkCache, TkItem};

#[derive(Debug, Parser)]
#[command(name = "sgcache", version, about = "Inspect and maintain the local item-list cache")]
pub struct Cli {
    /// Directory holding the database (defaults to the platform cache directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print the cached item list as JSON
    Show,
    /// Replace the cached item list with the items in a JSON file
    Import { file: PathBuf },
    /// List stored keys with their last update time
    Info,
    /// Delete the whole database
    Destroy,
}

/// Run one command, writing its report to `out`.
pub async fn run(command: Command, store: Arc<FileKvStore>, out: &mut impl Write) -> Result<()> {
    let cache = TkCache::new(store.clone());

    match command {
        Command::Show => match cache.get_cached_list().await? {
            Some(items) => writeln!(out, "{}", serde_json::to_string_pretty(&items)?)?,
            None => writeln!(out, "no cached item list")?,
        },
        Command::Import { file } => {
            let contents = tokio::fs::read_to_string(&file).await?;
            let items: Vec<TkItem> = serde_json::from_str(&contents)?;
            cache.set_cached_list(&items).await?;
            writeln!(out, "cached {} items", items.len())?;
        }
        Command::Info => {
            writeln!(out, "database: {}", paths::database_dir(store.config()).display())?;
            for key in store.keys().await? {
                let Some(record) = store.get_record(&key).await? else {
                    continue;
                };
                let updated = record
                    .updated_at_utc()
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_else(|| record.updated_at.to_string());
                writeln!(out, "{key}\t{updated}")?;
            }
        }
        Command::Destroy => {
            store.destroy().await?;
            writeln!(out, "database removed")?;
        }
    }

    Ok(())
}
