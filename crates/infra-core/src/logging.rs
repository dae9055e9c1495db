//! `tracing` setup for the CLI.
//!
//! Events go to `$XDG_STATE_HOME/infra/infra.log` so stdout stays free for
//! command output; `RUST_LOG` overrides the default filter.

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,infra=debug,infra_core=debug";
const LOG_FILE: &str = "infra.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn log_file_in(state_dir: &Path) -> PathBuf {
    state_dir.join(LOG_FILE)
}

/// Append structured logs to the XDG state log file.
/// Errors if the state dir or file cannot be opened; callers fall back to [`init_logging_stderr`].
pub fn init_logging() -> Result<()> {
    let state_dir = xdg::BaseDirectories::with_prefix("infra")?.get_state_home();
    fs::create_dir_all(&state_dir)
        .with_context(|| format!("create log dir {}", state_dir.display()))?;

    let path = log_file_in(&state_dir);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install subscriber: {e}"))?;

    tracing::info!("infra logging initialized at {}", path.display());
    Ok(())
}

/// Log to stderr only.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
