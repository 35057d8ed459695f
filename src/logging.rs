// Logging setup for the sgcache binary.

use std::io;

use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the tracing subscriber.
/// - Respects `RUST_LOG` if set
/// - Falls back to `sgcache=info`, or `sgcache=debug` when verbose
/// - Writes to stderr so command output on stdout stays clean
pub fn init_logging(verbose: bool) {
    let default = if verbose { "sgcache=debug" } else { "sgcache=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(io::stderr)
        .try_init();
}
