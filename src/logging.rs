//! Logging setup
//!
//! Events go to stderr and, when the data directory is available, to a
//! daily rolling file under `<data dir>/dev.loadcell.logger/logs`.
//! `RUST_LOG` overrides [`DEFAULT_FILTER`].

use crate::config::log_dir;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "info,loadcell_logger=debug";

/// Prefix of the rolling log files
pub const LOG_FILE_PREFIX: &str = "loadcell-logger.log";

/// Install the global subscriber.
///
/// The returned guard flushes the file writer when dropped; keep it alive
/// for the lifetime of the program.
pub fn init() -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let file_writer = log_dir().and_then(|dir| match std::fs::create_dir_all(&dir) {
        Ok(()) => Some(tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX)),
        Err(e) => {
            eprintln!("Could not create log directory {:?}: {}", dir, e);
            None
        }
    });

    match file_writer {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
            None
        }
    }
}
