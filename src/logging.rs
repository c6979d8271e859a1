//! Logger bootstrap.
//!
//! Diagnostics go to stderr, or to rotating files under `<home>/logs` when
//! the settings ask for it. `RUST_LOG` overrides the configured level.
//! Lines are `key=value` events (`event=... module=... status=...`).

use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming, WriteMode,
};
use log::info;
use std::path::Path;
use thiserror::Error;

const LOG_FILE_BASENAME: &str = "dot";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("unsupported log level `{0}`; expected trace|debug|info|warn|error|off")]
    InvalidLevel(String),
    #[error("failed to create log directory: {0}")]
    DirectoryError(String),
    #[error("failed to start logger: {0}")]
    Backend(#[from] FlexiLoggerError),
}

pub fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        "off" => Ok("off"),
        other => Err(LoggingError::InvalidLevel(other.to_string())),
    }
}

/// Starts the global logger. Keep the handle alive for the life of the
/// process; dropping it flushes and stops file output.
///
/// `log_dir` selects file output; `None` logs to stderr.
pub fn init_logging(level: &str, log_dir: Option<&Path>) -> Result<LoggerHandle, LoggingError> {
    let level = normalize_level(level)?;
    let logger = Logger::try_with_env_or_str(level)?;

    let handle = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .map_err(|e| LoggingError::DirectoryError(format!("{}: {e}", dir.display())))?;
            logger
                .log_to_file(FileSpec::default().directory(dir).basename(LOG_FILE_BASENAME))
                .rotate(
                    Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(MAX_LOG_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
                .start()?
        }
        None => logger.log_to_stderr().start()?,
    };

    info!(
        "event=app_start module=logging status=ok level={level} version={}",
        env!("CARGO_PKG_VERSION")
    );
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_normalized() {
        assert_eq!(normalize_level(" WARNING ").unwrap(), "warn");
        assert_eq!(normalize_level("debug").unwrap(), "debug");
        assert!(matches!(
            normalize_level("loud"),
            Err(LoggingError::InvalidLevel(level)) if level == "loud"
        ));
    }
}
