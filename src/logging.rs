//! Tracing configuration and log routing.
//!
//! Each run logs to stdout with a compact formatter and to a file. When
//! `MOVIE_DIGEST_LOG_FILE` is set, logs are appended to that path; otherwise they go to
//! `logs/movie-digest.log`. The file layer keeps targets so stage spans can be told apart.
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_FILE_VAR: &str = "MOVIE_DIGEST_LOG_FILE";
const LOG_DIR: &str = "logs";
const LOG_FILE_NAME: &str = "movie-digest.log";

/// Configure tracing subscribers for stdout and optional file logging.
///
/// - Respects `RUST_LOG` for filtering (defaults to `info`).
/// - Installs a compact stdout layer and, when available, a file layer.
/// - Returns the non‑blocking writer guard; hold it until the run ends so buffered lines are
///   flushed before the process exits.
pub fn init_tracing() -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer);

    match configure_file_writer() {
        Some((writer, guard)) => {
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .compact();

            if registry.with(file_layer).try_init().is_err() {
                eprintln!("Tracing subscriber already installed");
            }
            Some(guard)
        }
        None => {
            if registry.try_init().is_err() {
                eprintln!("Tracing subscriber already installed");
            }
            None
        }
    }
}

/// Build a non‑blocking writer for file logging.
///
/// Returns `None` when the logs directory cannot be created or the target file cannot be opened.
fn configure_file_writer() -> Option<(NonBlocking, WorkerGuard)> {
    if let Ok(path) = std::env::var(LOG_FILE_VAR) {
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            Ok(file) => Some(tracing_appender::non_blocking(file)),
            Err(err) => {
                eprintln!("Failed to open log file {path}: {err}");
                None
            }
        }
    } else {
        if let Err(err) = std::fs::create_dir_all(LOG_DIR) {
            eprintln!("Failed to create logs directory: {err}");
            return None;
        }
        let file_appender = tracing_appender::rolling::never(LOG_DIR, LOG_FILE_NAME);
        Some(tracing_appender::non_blocking(file_appender))
    }
}
