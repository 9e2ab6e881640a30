//! Configuration-driven logger construction
//!
//! [`Config`] and [`FileConfig`] are plain records that can be filled in code
//! or deserialized from an application's config file. Construction never
//! fails on bad values: unknown levels fall back to info and unknown formats
//! to JSON, only opening a log file can fail.

use super::{
    error::Result,
    log_level::LogLevel,
    logger::{Logger, LoggerBuilder},
    output_format::OutputFormat,
    timestamp::TimestampFormat,
};
use crate::appenders::{ConsoleAppender, JsonAppender, RotatingFile, RotationPolicy, Sink};
use parking_lot::Mutex;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Rotate after this many megabytes when `max_size` is zero
pub const DEFAULT_MAX_SIZE_MB: u64 = 100;
/// Rotated files kept when `max_backups` is zero
pub const DEFAULT_MAX_BACKUPS: usize = 3;
/// Days rotated files are kept when `max_age` is zero
pub const DEFAULT_MAX_AGE_DAYS: u64 = 28;

/// Logger configuration
///
/// ```
/// use logwrap::Config;
///
/// let config: Config = serde_json::from_str(r#"{"level": "debug", "format": "json"}"#).unwrap();
/// assert_eq!(config.level, "debug");
/// assert!(config.output.is_none());
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minimum level name; empty or unknown means info
    pub level: String,

    /// `console` for human-readable output, anything else for JSON;
    /// empty means console
    pub format: String,

    /// Named time format or strftime pattern; empty means RFC 3339
    pub time_format: String,

    /// Destination; `None` means stderr
    #[serde(skip)]
    pub output: Option<Sink>,

    /// Record the `file:line` of each log statement
    pub caller: bool,
}

impl Config {
    /// Read `{prefix}_LOG_LEVEL` and `{prefix}_LOG_FORMAT`; unset variables
    /// are left empty so the defaults apply.
    pub fn from_env(prefix: &str) -> Self {
        Self {
            level: env_var(prefix, "LOG_LEVEL"),
            format: env_var(prefix, "LOG_FORMAT"),
            ..Self::default()
        }
    }

    pub fn level(&self) -> LogLevel {
        parse_level(&self.level)
    }

    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::resolve(&self.format)
    }

    pub fn timestamp_format(&self) -> TimestampFormat {
        TimestampFormat::resolve(&self.time_format)
    }

    /// Builder preloaded with the level, caller flag and primary appender
    fn builder(&self) -> LoggerBuilder {
        let sink = self.output.clone().unwrap_or_else(Sink::stderr);
        let timestamp_format = self.timestamp_format();

        let builder = Logger::builder()
            .min_level(self.level())
            .caller(self.caller);

        match self.output_format() {
            OutputFormat::Console => builder.appender(
                ConsoleAppender::with_sink(sink).with_timestamp_format(timestamp_format),
            ),
            OutputFormat::Json => builder
                .appender(JsonAppender::new(sink).with_timestamp_format(timestamp_format)),
        }
    }
}

/// Rotating log file configuration
///
/// Zero limits are replaced with 100 MB, 3 backups and 28 days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub enabled: bool,
    pub path: PathBuf,
    /// Megabytes before rotation
    pub max_size: u64,
    pub max_backups: usize,
    /// Days to keep rotated files
    pub max_age: u64,
    /// Gzip rotated files
    pub compress: bool,
}

impl FileConfig {
    /// Rotation limits with zero values replaced by the defaults
    pub fn rotation_policy(&self) -> RotationPolicy {
        RotationPolicy::from_limits(
            non_zero_or(self.max_size, DEFAULT_MAX_SIZE_MB),
            if self.max_backups == 0 {
                DEFAULT_MAX_BACKUPS
            } else {
                self.max_backups
            },
            non_zero_or(self.max_age, DEFAULT_MAX_AGE_DAYS),
            self.compress,
        )
    }

    fn is_active(&self) -> bool {
        self.enabled && !self.path.as_os_str().is_empty()
    }
}

/// Keeps the log file of [`Logger::with_file`] open
///
/// Call [`FileGuard::release`] on shutdown. Dropping the guard without
/// releasing it only flushes.
#[must_use = "release the guard on shutdown to close the log file"]
#[derive(Default)]
pub struct FileGuard {
    file: Option<Arc<Mutex<RotatingFile>>>,
}

impl FileGuard {
    fn noop() -> Self {
        Self::default()
    }

    /// Whether a file is attached
    pub fn is_active(&self) -> bool {
        self.file.is_some()
    }

    /// Limits the attached file rotates under
    pub fn rotation_policy(&self) -> Option<RotationPolicy> {
        self.file.as_ref().map(|file| file.lock().policy().clone())
    }

    /// Flush and close the log file
    pub fn release(mut self) -> Result<()> {
        match self.file.take() {
            Some(file) => file.lock().close(),
            None => Ok(()),
        }
    }
}

impl Drop for FileGuard {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            use std::io::Write;
            if let Err(e) = file.lock().flush() {
                eprintln!("[LOGGER ERROR] Failed to flush log file: {}", e);
            }
        }
    }
}

impl Logger {
    /// Build a logger from `config`
    ///
    /// ```
    /// use logwrap::{Config, LogLevel, Logger};
    ///
    /// let logger = Logger::new(Config {
    ///     level: "nonsense".into(),
    ///     ..Config::default()
    /// });
    /// assert_eq!(logger.level(), LogLevel::Info);
    /// ```
    pub fn new(config: Config) -> Self {
        config.builder().build()
    }

    /// Build a logger from `{prefix}_LOG_LEVEL` and `{prefix}_LOG_FORMAT`
    pub fn from_env(prefix: &str) -> Self {
        Self::new(Config::from_env(prefix))
    }

    /// Build a logger that also writes JSON lines to a rotating file
    ///
    /// When file logging is disabled or has no path this is
    /// [`Logger::new`] with a guard that does nothing.
    ///
    /// # Errors
    ///
    /// Returns error if the log file or its directory cannot be created
    pub fn with_file(config: Config, file_config: FileConfig) -> Result<(Logger, FileGuard)> {
        if !file_config.is_active() {
            return Ok((Logger::new(config), FileGuard::noop()));
        }

        let file = Arc::new(Mutex::new(RotatingFile::new(
            &file_config.path,
            file_config.rotation_policy(),
        )?));

        let logger = config
            .builder()
            .appender(
                JsonAppender::new(Sink::from_shared(file.clone()))
                    .with_timestamp_format(config.timestamp_format()),
            )
            .build();

        Ok((logger, FileGuard { file: Some(file) }))
    }
}

/// Parse a level name case-insensitively; anything unrecognized is info
///
/// ```
/// use logwrap::{parse_level, LogLevel};
///
/// assert_eq!(parse_level("WARNING"), LogLevel::Warn);
/// assert_eq!(parse_level(""), LogLevel::Info);
/// assert_eq!(parse_level("verbose"), LogLevel::Info);
/// ```
pub fn parse_level(level: &str) -> LogLevel {
    LogLevel::parse_lenient(level)
}

fn env_var(prefix: &str, name: &str) -> String {
    std::env::var(format!("{}_{}", prefix, name)).unwrap_or_default()
}

fn non_zero_or(value: u64, default: u64) -> u64 {
    if value == 0 {
        default
    } else {
        value
    }
}
