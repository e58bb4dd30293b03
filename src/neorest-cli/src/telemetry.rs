//! File-based structured logging
//!
//! - JSON formatted logs to file
//! - Human-readable console output on stderr (stdout carries results)
//! - Size-based rotation (10MB per file) plus daily rotation

use anyhow::Result;
use neorest_core::LogLevel;
use rolling_file::{RollingConditionBasic, RollingFileAppender};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Initialize tracing with file logging at the configured level.
///
/// Returns a guard that must be kept alive to ensure logs are flushed.
/// `RUST_LOG` overrides the configured level.
pub fn init_telemetry(level: LogLevel) -> Result<WorkerGuard> {
    let log_dir = Path::new("./logs");
    std::fs::create_dir_all(log_dir)?;

    // neorest.log, rotated daily or at 10 MB, whichever comes first
    let file_appender = RollingFileAppender::new(
        log_dir.join("neorest.log"),
        RollingConditionBasic::new()
            .daily()
            .max_size(10 * 1024 * 1024),
        9,
    )?;

    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level.as_filter();
        EnvFilter::new(format!(
            "neorest={level},neorest_rs={level},neorest_core={level}"
        ))
    });

    let file_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_span_events(FmtSpan::CLOSE)
        .with_current_span(true)
        .with_target(true)
        .with_thread_ids(true);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    tracing::debug!("Telemetry initialized with file logging to {:?}", log_dir);

    Ok(guard)
}
