use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Where log output goes. The TUI owns stdout, so it logs to a file.
pub enum LogTarget {
    Stderr,
    File,
}

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("taskdesk={}", level)))
}

/// Installs the global subscriber. `log` records from this crate and its
/// dependencies are forwarded to it.
pub fn init(config: &LogConfig, target: LogTarget) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(&config.level))
        .with_target(false);

    match target {
        LogTarget::Stderr => builder
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install logger: {}", e)),
        LogTarget::File => {
            let path = config.file_path();
            let file = open_log_file(&path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow::anyhow!("failed to install logger: {}", e))
        }
    }
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}
