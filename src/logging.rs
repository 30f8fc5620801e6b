//! Logging setup for the command-line tool.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Initialize structured logging on stderr.
///
/// `RUST_LOG` wins when set; otherwise `default_directive` (e.g. `info`) is used.
pub fn init_logging(default_directive: &str) -> Result<()> {
  let env_filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

  tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .without_time()
    .try_init()
    .map_err(|err| anyhow!("failed to initialize logging: {err}"))?;

  tracing::debug!("htmlcpr logging initialized at level {default_directive}");

  Ok(())
}

/// Map CLI verbosity flags to a default filter directive.
pub fn directive_for(verbose: u8, quiet: bool) -> &'static str {
  if quiet {
    return "warn";
  }
  match verbose {
    0 => "info",
    1 => "debug",
    _ => "trace",
  }
}
