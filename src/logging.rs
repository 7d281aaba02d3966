//! Tracing subscriber setup shared by the binaries.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

const LOG_FILE_PREFIX: &str = "airbnb-serve.log";

fn default_filter(level: &str) -> String {
    format!("{level},airbnb_serve=debug,tower_http=info")
}

/// Daily-rotated appender under `dir`, or `None` when the directory or today's
/// log file cannot be written.
///
/// `tracing_appender::rolling::daily` panics (and in release builds, aborts)
/// if it can't create the initial log file, so use the fallible builder after
/// a write preflight.
fn file_appender(dir: &Path) -> Option<RollingFileAppender> {
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!(
            "Warning: Could not create log directory {} ({}), file logging disabled",
            dir.display(),
            e
        );
        return None;
    }

    let test_path = dir.join(".airbnb_write_test");
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&test_path)
    {
        Ok(_) => {
            let _ = std::fs::remove_file(&test_path);
        }
        Err(e) => {
            eprintln!(
                "Warning: Could not write to log directory {} ({}), file logging disabled",
                dir.display(),
                e
            );
            return None;
        }
    }

    match RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(dir)
    {
        Ok(appender) => Some(appender),
        Err(e) => {
            eprintln!(
                "Warning: Could not open log file in {} ({}), file logging disabled",
                dir.display(),
                e
            );
            None
        }
    }
}

pub fn init_logging(cfg: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(&cfg.level)));

    let file_layer = cfg.dir.as_deref().and_then(file_appender).map(|appender| {
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        // Keep the guard alive for the life of the process
        Box::leak(Box::new(guard));

        tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
    });

    let console_layer = if cfg.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed()
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

pub fn init_logging_simple() {
    // Minimal logging for one-shot CLI commands
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}
