//! Diagnostic logging for the `stock` binary.
//!
//! Command output goes to stdout; log lines go to stderr so they never
//! mix with `--json` output.

use std::str::FromStr;

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Installs the global subscriber at the given level
/// (`error`, `warn`, `info`, `debug`, or `trace`).
pub fn init(level: &str) -> Result<()> {
    let level = parse_level(level)?;
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn parse_level(level: &str) -> Result<Level> {
    Level::from_str(level.trim()).map_err(|_| {
        anyhow!(
            "Unknown log level: {}. Use error, warn, info, debug, or trace.",
            level
        )
    })
}
