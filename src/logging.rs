//! tracing subscriber setup.
//!
//! The terminal UI owns the screen, so the quiz logs to a file; the other
//! subcommands log to stderr.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const ENV_LOG: &str = "FICOUS_LOG";
pub const LOG_FILE: &str = "ficous-quiz.log";

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new(default_filter))
}

pub fn init_stderr(default_filter: &str) -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| format!("Cannot initialise logging: {}", e))
}

/// Append log lines to `dir/ficous-quiz.log`.
pub fn init_file(dir: &Path, default_filter: &str) -> Result<(), String> {
    fs::create_dir_all(dir).map_err(|e| format!("Cannot create {}: {}", dir.display(), e))?;
    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| format!("Cannot open log file {}: {}", path.display(), e))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| format!("Cannot initialise logging: {}", e))
}
