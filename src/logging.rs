use tracing_subscriber::EnvFilter;

use crate::error::{Result, ToolError};

/// Installs a stderr `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// `info` (or `debug` when `verbose` is set).
pub fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|error| ToolError::Logging(error.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}
