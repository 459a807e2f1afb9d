//! tracing subscriber setup

use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV: &str = "UNDUPE_LOG";

/// Where log output goes
pub enum LogTarget {
    /// The terminal belongs to the TUI; write to a file instead
    File,
    Stderr,
}

pub fn log_file_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("undupe").join("undupe.log"))
}

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber. Failing to open the log file only disables logging.
pub fn init(target: LogTarget) {
    match target {
        LogTarget::Stderr => {
            let _ = tracing_subscriber::registry()
                .with(filter("warn"))
                .with(fmt::layer().with_writer(std::io::stderr))
                .try_init();
        }
        LogTarget::File => {
            let Some(path) = log_file_path() else {
                return;
            };
            if let Some(dir) = path.parent() {
                if fs::create_dir_all(dir).is_err() {
                    return;
                }
            }
            let Ok(file) = File::options().create(true).append(true).open(&path) else {
                return;
            };
            let _ = tracing_subscriber::registry()
                .with(filter("info"))
                .with(
                    fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init();
        }
    }
}
