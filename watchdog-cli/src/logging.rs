//! Tracing setup
//!
//! The terminal dashboard owns the screen, so it logs to a daily rolling
//! file. One-shot commands log to stderr. `RUST_LOG` overrides the default
//! filter in both cases.

use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "watchdog=info,watchdog_core=info";
const VERBOSE_FILTER: &str = "watchdog=debug,watchdog_core=debug";

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER }))
}

/// `<data_local_dir>/watchdog/logs`, or `./logs` when the platform has none
pub fn default_log_dir() -> PathBuf {
    dirs_next::data_local_dir()
        .map(|dir| dir.join("watchdog").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Log to `<log_dir>/watchdog.log.<date>`. Keep the guard alive for the
/// life of the program or buffered lines are lost.
pub fn init_file(log_dir: &Path, verbose: bool) -> io::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "watchdog.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();
    Ok(guard)
}

pub fn init_stderr(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
