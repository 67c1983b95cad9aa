//! Installs the process-wide log subscriber.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Installs a `tracing` subscriber that writes to stderr. `RUST_LOG` takes
/// precedence over `verbosity` unless `quiet` is set, in which case only
/// errors are shown.
pub fn init(verbosity: u8, quiet: bool) -> Result<()> {
    let level = match verbosity {
        0 => "quire=info,warn",
        1 => "quire=debug,info",
        _ => "trace",
    };

    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {}", e))
}
