//! Logging configuration using tracing
//!
//! Diagnostics go to a rotating file, never to the terminal: the terminal
//! belongs to the external tools we stream (xcodebuild, log stream).

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Initialize the logging subsystem
///
/// Logs are written to `~/.local/share/xcpilot/logs/`
/// Log level is controlled by the `XCPILOT_LOG` environment variable.
///
/// # Examples
/// ```bash
/// XCPILOT_LOG=debug xcpilot run
/// ```
pub fn init() -> Result<()> {
    let log_dir = log_directory();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "xcpilot.log");

    // Default to info, allow override via XCPILOT_LOG
    let env_filter = EnvFilter::try_from_env("XCPILOT_LOG")
        .unwrap_or_else(|_| EnvFilter::new("xcpilot=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!("xcpilot starting");
    tracing::info!("Log directory: {}", log_dir.display());

    Ok(())
}

/// Get the log directory path
fn log_directory() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("xcpilot").join("logs")
}
