//! Centralized logging configuration for the Subcast binaries
//!
//! Provides consistent logging setup with support for:
//! - Text, JSON, and pretty-printed output
//! - Environment variable configuration
//! - Optional log file instead of stderr
//!
//! # Examples
//!
//! ```no_run
//! use libsubcast::logging::{LoggingConfig, LogFormat};
//!
//! // Initialize with JSON format
//! let config = LoggingConfig::new(LogFormat::Json, "info".to_string(), false);
//! config.init();
//!
//! // Or use default settings (respects env vars)
//! libsubcast::logging::init_default();
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable text output (no colors, for piping)
    Text,
    /// Machine-parseable JSON (one JSON object per line)
    Json,
    /// Pretty-printed with colors (for development)
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                s
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

/// Configuration for logging initialization
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
    pub verbose: bool,
    /// Append to this file instead of writing to stderr
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Create a new logging configuration
    ///
    /// # Arguments
    ///
    /// * `format` - Log output format (text, json, or pretty)
    /// * `level` - Minimum log level (error, warn, info, debug, trace)
    /// * `verbose` - If true, defaults to debug level
    pub fn new(format: LogFormat, level: String, verbose: bool) -> Self {
        Self {
            format,
            level,
            verbose,
            file: None,
        }
    }

    /// Send log output to `path` (appending) instead of stderr
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Initialize logging with the configured settings
    ///
    /// This should be called once at the start of your program. If the log
    /// file cannot be opened, output falls back to stderr with a warning.
    ///
    /// # Panics
    ///
    /// Panics if the logging subscriber has already been initialized
    pub fn init(&self) {
        use tracing_subscriber::EnvFilter;

        let filter = if self.verbose {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
        };

        let (writer, ansi, file_error) = self.make_writer();

        match self.format {
            LogFormat::Json => {
                tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(filter)
                    .with_writer(writer)
                    .with_current_span(true)
                    .with_span_list(true)
                    .flatten_event(true)
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::fmt()
                    .pretty()
                    .with_env_filter(filter)
                    .with_writer(writer)
                    .with_ansi(ansi)
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .init();
            }
            LogFormat::Text => {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(writer)
                    .with_ansi(ansi)
                    .with_target(false)
                    .with_level(true)
                    .init();
            }
        }

        if let Some(err) = file_error {
            tracing::warn!("Could not open log file, logging to stderr: {}", err);
        }
    }

    fn make_writer(&self) -> (BoxMakeWriter, bool, Option<std::io::Error>) {
        let Some(path) = &self.file else {
            return (BoxMakeWriter::new(std::io::stderr), true, None);
        };

        match std::fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => (BoxMakeWriter::new(Mutex::new(file)), false, None),
            Err(e) => (BoxMakeWriter::new(std::io::stderr), true, Some(e)),
        }
    }
}

/// Initialize logging with default settings
///
/// Respects `SUBCAST_LOG_FORMAT`, `SUBCAST_LOG_LEVEL` and `SUBCAST_LOG_FILE`.
/// Falls back to text format with info level on stderr if not set.
///
/// # Examples
///
/// ```bash
/// export SUBCAST_LOG_FORMAT=json
/// export SUBCAST_LOG_FILE=app.log
/// sub-serve
/// ```
pub fn init_default() {
    from_env(false).init();
}

/// Build a logging configuration from the `SUBCAST_LOG_*` variables
pub fn from_env(verbose: bool) -> LoggingConfig {
    let format = std::env::var("SUBCAST_LOG_FORMAT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(LogFormat::Text);

    let level = std::env::var("SUBCAST_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let config = LoggingConfig::new(format, level, verbose);
    match std::env::var("SUBCAST_LOG_FILE") {
        Ok(path) if !path.trim().is_empty() => {
            config.with_file(shellexpand::tilde(&path).to_string())
        }
        _ => config,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);

        // Case insensitive
        assert_eq!("TEXT".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("Json".parse::<LogFormat>().unwrap(), LogFormat::Json);
    }

    #[test]
    fn test_log_format_from_str_invalid() {
        let result = "invalid".parse::<LogFormat>();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid log format: 'invalid'"));
    }

    #[test]
    fn test_log_format_display() {
        assert_eq!(LogFormat::Text.to_string(), "text");
        assert_eq!(LogFormat::Json.to_string(), "json");
        assert_eq!(LogFormat::Pretty.to_string(), "pretty");
    }

    #[test]
    fn test_with_file() {
        let config = LoggingConfig::new(LogFormat::Text, "info".to_string(), false)
            .with_file("/tmp/subcast.log");
        assert_eq!(config.file, Some(PathBuf::from("/tmp/subcast.log")));
    }

    #[test]
    fn test_make_writer_falls_back_to_stderr() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = LoggingConfig::new(LogFormat::Text, "info".to_string(), false)
            .with_file(dir.path().join("missing-dir").join("app.log"));

        let (_writer, ansi, err) = config.make_writer();
        assert!(ansi);
        assert!(err.is_some());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_variables() {
        std::env::set_var("SUBCAST_LOG_FORMAT", "json");
        std::env::set_var("SUBCAST_LOG_LEVEL", "warn");
        std::env::set_var("SUBCAST_LOG_FILE", "app.log");

        let config = from_env(false);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "warn");
        assert_eq!(config.file, Some(PathBuf::from("app.log")));

        std::env::remove_var("SUBCAST_LOG_FORMAT");
        std::env::remove_var("SUBCAST_LOG_LEVEL");
        std::env::remove_var("SUBCAST_LOG_FILE");

        let config = from_env(true);
        assert_eq!(config.format, LogFormat::Text);
        assert_eq!(config.level, "info");
        assert!(config.verbose);
        assert!(config.file.is_none());
    }
}
