//! Tracing setup for hosts
//!
//! The CLI prints results and a progress line on stdout, so diagnostics go to
//! `.logs/vibrax.YYYY-MM-DD.log` instead.

use tracing_appender::non_blocking::NonBlocking;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const LOG_DIR: &str = ".logs";
const LOG_FILE_PREFIX: &str = "vibrax";

/// Filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_FILTER: &str = "vibrax=debug,reqwest=info,warn";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging() -> anyhow::Result<()> {
    let writer = file_writer()?;

    let fmt_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .try_init()?;

    tracing::info!(dir = LOG_DIR, "Logging initialized");
    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Daily-rolled file behind a background writer thread.
fn file_writer() -> anyhow::Result<NonBlocking> {
    std::fs::create_dir_all(LOG_DIR)?;
    let appender = RollingFileAppender::new(Rotation::DAILY, LOG_DIR, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    // Dropping the guard stops the writer thread; the process never needs to.
    std::mem::forget(guard);
    Ok(writer)
}

/// Log the outcome of a catalog or liked-store call.
#[macro_export]
macro_rules! log_api_result {
    ($operation:expr, $result:expr) => {
        match &$result {
            Ok(_) => tracing::info!(operation = $operation, "Remote call succeeded"),
            Err(e) => tracing::error!(operation = $operation, error = %e, "Remote call failed"),
        }
    };
}

/// Log the start of a remote call with extra fields.
#[macro_export]
macro_rules! log_api_request {
    ($operation:expr, $($field:tt)*) => {
        tracing::debug!(operation = $operation, $($field)*, "Remote call started");
    };
}
