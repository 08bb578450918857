//! Global tracing setup for the `methodscope` binary.
//!
//! Two layers with their own filters: a daily-rolling file that records
//! everything at `RUST_LOG` (default `info`), and the console, which shows
//! build warnings always and per-decision debug output only when verbose.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Overrides the log directory.
pub const LOG_DIR_ENV: &str = "METHODSCOPE_LOG_DIR";

/// `$METHODSCOPE_LOG_DIR`, else `~/.methodscope/logs`.
pub fn log_dir() -> PathBuf {
    std::env::var_os(LOG_DIR_ENV)
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".methodscope").join("logs")))
        .unwrap_or_else(|| PathBuf::from(".methodscope-logs"))
}

pub fn console_directives(verbose: bool) -> &'static str {
    if verbose {
        "warn,methodscope_core=debug,methodscope_cli=debug"
    } else {
        "warn"
    }
}

/// Installs the global subscriber. The file layer is skipped when the log
/// directory cannot be created; the returned guard flushes it on drop.
pub fn init_logging(component: &str, verbose: bool) -> Option<WorkerGuard> {
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .without_time()
        .with_filter(EnvFilter::new(console_directives(verbose)));

    let dir = log_dir();
    let (file, guard) = match std::fs::create_dir_all(&dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(&dir, format!("{}.log", component));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter);
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry().with(file).with(console).init();
    if guard.is_none() {
        tracing::warn!("Cannot create log directory {}; logging to console only", dir.display());
    }
    guard
}
