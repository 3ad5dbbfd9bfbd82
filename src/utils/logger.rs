//! Logging initialization and configuration.
//!
//! Diagnostics go to files rather than anywhere user-visible: the widget's
//! output region is reserved for answers and error text, so tracing must not
//! leak into it. One log file per run, timestamped.
//!
//! # Configuration
//!
//! The log level is controlled via the `RUST_LOG` environment variable
//! (`debug`, `info`, `warn`, `error`), defaulting to `info`.

use std::fs;
use std::path::PathBuf;

use chrono::Local;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize file-based logging for a hosting application.
///
/// Creates `~/.askbox/logs/askbox.<timestamp>.log` and installs a global
/// subscriber writing there. Call at most once per process; embedders that
/// already have a subscriber should skip this entirely.
pub fn init_logging() {
    let log_dir = std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".askbox")
        .join("logs");

    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Warning: failed to create log directory: {}", e);
        return;
    }

    // One file per run: askbox.2025-08-29-14-30-25.log
    let timestamp = Local::now().format("%Y-%m-%d-%H-%M-%S");
    let log_path = log_dir.join(format!("askbox.{}.log", timestamp));

    let log_file = match fs::File::create(&log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: failed to create log file: {}", e);
            return;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    // Keep the non-blocking writer alive for the program lifetime.
    std::mem::forget(guard);

    tracing::info!("logging initialized, writing to {}", log_path.display());
}
