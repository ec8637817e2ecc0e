//! Tracing subscriber setup.

use anyhow::{anyhow, Result};
use tracing::Level;

/// Maps the `-v` count to the most verbose level that is logged.
pub const fn verbosity_level(v: u8) -> Level {
    match v {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Installs the global fmt subscriber.
pub fn init_tracing_subscriber(v: u8) -> Result<()> {
    let subscriber = tracing_subscriber::fmt().with_max_level(verbosity_level(v)).finish();
    tracing::subscriber::set_global_default(subscriber).map_err(|e| anyhow!(e))
}
