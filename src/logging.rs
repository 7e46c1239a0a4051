//! File-only logging.
//!
//! The TUI owns stdout, so log lines go to `calmie.log` in the state
//! directory. Set `DEBUG_LOGGING=1` for debug output from this crate.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::app_dirs::AppDirs;

pub const LOG_FILE_NAME: &str = "calmie.log";

fn filter_directive(debug_logging: bool) -> &'static str {
    if debug_logging {
        "info,calmie=debug"
    } else {
        "info"
    }
}

/// Install the global subscriber. The returned guard must be held until exit
/// so buffered lines are flushed. Returns `None` when no log directory can be
/// created, in which case logging is disabled.
pub fn init() -> Option<WorkerGuard> {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let log_dir = AppDirs::state_dir()?;
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        // no subscriber yet and the terminal is about to be taken over
        eprintln!("Failed to create log directory {:?}: {}", log_dir, e);
        return None;
    }

    let file_appender = tracing_appender::rolling::never(&log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    let filter = EnvFilter::new(filter_directive(debug_logging));

    if tracing_subscriber::registry()
        .with(file_layer)
        .with(filter)
        .try_init()
        .is_err()
    {
        return None;
    }

    tracing::info!(
        log_file = ?log_dir.join(LOG_FILE_NAME),
        debug_logging,
        "calmie logging initialized"
    );

    Some(guard)
}
