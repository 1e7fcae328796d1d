//! Logging setup.
//!
//! The terminal belongs to the UI, so events go to a file:
//! `<cache dir>/ragchat/ragchat.log`. The filter comes from `RAGCHAT_LOG`
//! (same syntax as `RUST_LOG`), falling back to the configured level.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "RAGCHAT_LOG";

pub fn log_path() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .ok_or_else(|| anyhow!("Could not determine cache directory"))?;

    Ok(cache_dir.join("ragchat").join("ragchat.log"))
}

/// Filter from the environment if set, otherwise `ragchat_core=<level>,ragchat=<level>`
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,ragchat_core={level},ragchat_tui={level},ragchat={level}"))
    })
}

fn open_log(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Install the global subscriber. Returns where the log is written.
pub fn init(level: &str) -> Result<PathBuf> {
    let path = log_path()?;
    let file = open_log(&path)?;

    tracing_subscriber::registry()
        .with(build_filter(level))
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .map_err(|e| anyhow!("failed to install logger: {e}"))?;

    Ok(path)
}
