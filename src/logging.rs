/// Structured logging for the streamflow evaluation service
///
/// Provides context-rich logging with component and site identifiers,
/// timestamps, and severity levels. Supports both console output and
/// file-based logging for long-running deployments.

use chrono::Utc;
use serde::Deserialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use crate::model::EvalError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Storage,
    Database,
    Align,
    Metrics,
    Evaluation,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Storage => write!(f, "S3"),
            Component::Database => write!(f, "DB"),
            Component::Align => write!(f, "ALIGN"),
            Component::Metrics => write!(f, "METRIC"),
            Component::Evaluation => write!(f, "EVAL"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - the site or model simply has no stored series
    Expected,
    /// Unexpected failure - indicates storage degradation or configuration issue
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut global) = LOGGER.lock() {
            *global = Some(logger);
        }
    }

    fn log(&self, level: LogLevel, component: Component, site_id: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let site_part = site_id.map(|s| format!(" [{}]", s)).unwrap_or_default();
        let log_entry = format_entry(&timestamp.to_string(), level, component, site_id, message);

        // Console output goes to stderr; stdout carries the plot JSON.
        if self.console_timestamps {
            eprintln!("{}", log_entry);
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", component, site_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", component, site_part, message),
                LogLevel::Info => eprintln!("   {}", message),
                LogLevel::Debug => eprintln!("   [DEBUG] {}{}: {}", component, site_part, message),
            }
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

fn format_entry(
    timestamp: &str,
    level: LogLevel,
    component: Component,
    site_id: Option<&str>,
    message: &str,
) -> String {
    let site_part = site_id.map(|s| format!(" [{}]", s)).unwrap_or_default();
    format!("{} {} {}{}: {}", timestamp, level, component, site_part, message)
}

fn emit(level: LogLevel, component: Component, site_id: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, component, site_id, message);
        }
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

/// Log a general informational message
pub fn info(component: Component, site_id: Option<&str>, message: &str) {
    emit(LogLevel::Info, component, site_id, message);
}

/// Log a warning message
pub fn warn(component: Component, site_id: Option<&str>, message: &str) {
    emit(LogLevel::Warning, component, site_id, message);
}

/// Log an error message
pub fn error(component: Component, site_id: Option<&str>, message: &str) {
    emit(LogLevel::Error, component, site_id, message);
}

/// Log a debug message
pub fn debug(component: Component, site_id: Option<&str>, message: &str) {
    emit(LogLevel::Debug, component, site_id, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a storage failure.
///
/// A missing object is normal (not every site has every model), transport
/// errors point at the storage service, and anything else is unclear.
pub fn classify_storage_failure(err: &EvalError) -> FailureType {
    match err {
        EvalError::NotFound { .. } => FailureType::Expected,
        EvalError::Storage(_) => FailureType::Unexpected,
        _ => FailureType::Unknown,
    }
}

/// Log a storage failure with automatic classification
pub fn log_storage_failure(site_id: &str, operation: &str, err: &EvalError) {
    let failure_type = classify_storage_failure(err);
    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => debug(Component::Storage, Some(site_id), &message),
        FailureType::Unexpected => error(Component::Storage, Some(site_id), &message),
        FailureType::Unknown => warn(Component::Storage, Some(site_id), &message),
    }
}

/// Log that the requested evaluation is being replaced by the default one.
pub fn log_fallback(site_id: &str, trigger: &EvalError) {
    warn(
        Component::Evaluation,
        Some(site_id),
        &format!("Requested evaluation failed, using default configuration: {}", trigger),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SeriesKind;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_failure_classification() {
        let missing = EvalError::NotFound {
            kind: SeriesKind::Modeled,
            key: "LSTM segment 10375648".to_string(),
        };
        assert_eq!(classify_storage_failure(&missing), FailureType::Expected);

        let http = EvalError::Storage("HTTP error: 500".to_string());
        assert_eq!(classify_storage_failure(&http), FailureType::Unexpected);

        let bad = EvalError::MalformedRecord("no 'Datetime' column".to_string());
        assert_eq!(classify_storage_failure(&bad), FailureType::Unknown);
    }

    #[test]
    fn test_entry_format_includes_component_and_site() {
        let entry = format_entry(
            "2024-05-01 13:00:00 UTC",
            LogLevel::Warning,
            Component::Evaluation,
            Some("10171000"),
            "fallback",
        );
        assert_eq!(entry, "2024-05-01 13:00:00 UTC WARN EVAL [10171000]: fallback");

        let no_site = format_entry("t", LogLevel::Info, Component::System, None, "started");
        assert_eq!(no_site, "t INFO SYS: started");
    }
}
