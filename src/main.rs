// sgcache - inspect and maintain the local item-list cache.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::error;

use sgcache::cli::{Cli, run};
use sgcache::logging::init_logging;
use sgcache::{FileKvStore, StoreConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let Some(config) = StoreConfig::resolve(cli.root) else {
        error!("no cache directory available, pass --root");
        return ExitCode::from(2);
    };

    let store = Arc::new(FileKvStore::new(config));
    match run(cli.command, store, &mut io::stdout().lock()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
