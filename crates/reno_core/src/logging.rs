//! Process-wide logging bootstrap.
//!
//! Diagnostics go to stderr so that stdout stays clean for command output
//! and `--json` payloads. Messages are `key=value` pairs starting with
//! `event=` and `module=`.

use crate::error::AppError;
use flexi_logger::{Logger, LoggerHandle, WriteMode};
use log::info;
use once_cell::sync::OnceCell;

const LOG_ENV_VAR: &str = "RENO_LOG";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    _logger: LoggerHandle,
}

/// Picks the level from `RENO_LOG`, then `configured`, then the default.
pub fn resolve_level(configured: Option<&str>) -> Result<&'static str, AppError> {
    if let Ok(value) = std::env::var(LOG_ENV_VAR)
        && !value.trim().is_empty()
    {
        return normalize_level(&value);
    }
    match configured {
        Some(value) if !value.trim().is_empty() => normalize_level(value),
        _ => Ok(DEFAULT_LOG_LEVEL),
    }
}

/// Starts the stderr logger once per process.
///
/// Repeating the call with the same level is a no-op; asking for a
/// different level after initialization is rejected.
pub fn init_logging(level: &str) -> Result<(), AppError> {
    let level = normalize_level(level)?;

    let state = LOGGING_STATE.get_or_try_init(|| -> Result<LoggingState, AppError> {
        let logger = Logger::try_with_str(level)
            .map_err(|err| AppError::invalid_input(format!("invalid log level `{level}`: {err}")))?
            .log_to_stderr()
            .write_mode(WriteMode::Direct)
            .format(flexi_logger::default_format)
            .start()
            .map_err(|err| AppError::io(format!("failed to start logger: {err}")))?;

        info!(
            "event=app_start module=core status=ok platform={} version={} level={}",
            std::env::consts::OS,
            env!("CARGO_PKG_VERSION"),
            level
        );

        Ok(LoggingState {
            level,
            _logger: logger,
        })
    })?;

    if state.level != level {
        return Err(AppError::invalid_input(format!(
            "logging already initialized with level `{}`; refusing to switch to `{}`",
            state.level, level
        )));
    }
    Ok(())
}

fn normalize_level(raw: &str) -> Result<&'static str, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "off" | "none" => Ok("off"),
        "error" => Ok("error"),
        "warn" | "warning" => Ok("warn"),
        "info" => Ok("info"),
        "debug" => Ok("debug"),
        "trace" => Ok("trace"),
        other => Err(AppError::invalid_input(format!(
            "unsupported log level `{other}`"
        ))),
    }
}
