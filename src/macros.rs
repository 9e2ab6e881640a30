//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`.
//!
//! # Examples
//!
//! ```
//! use logwrap::prelude::*;
//! use logwrap::info;
//!
//! let logger = Logger::default();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // Complex formatting
//! let user_id = 42;
//! let action = "login";
//! info!(logger, "User {} performed action: {}", user_id, action);
//! ```

/// Log a message with automatic formatting.
///
/// The message is only formatted when the level is enabled.
///
/// # Examples
///
/// ```
/// # use logwrap::prelude::*;
/// # let logger = Logger::default();
/// use logwrap::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.event($level).msgf(format_args!($($arg)+))
    };
}

/// Log a trace-level message.
///
/// # Examples
///
/// ```
/// # use logwrap::prelude::*;
/// # let logger = Logger::default().with_level(LogLevel::Trace);
/// use logwrap::trace;
/// trace!(logger, "Entering function: calculate()");
/// trace!(logger, "Variable value: {}", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use logwrap::prelude::*;
/// # let logger = Logger::default();
/// use logwrap::debug;
/// debug!(logger, "Debug information");
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use logwrap::prelude::*;
/// # let logger = Logger::default();
/// use logwrap::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use logwrap::prelude::*;
/// # let logger = Logger::default();
/// use logwrap::warn;
/// warn!(logger, "Low disk space");
/// warn!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use logwrap::prelude::*;
/// # let logger = Logger::default();
/// use logwrap::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message.
///
/// # Examples
///
/// ```
/// # use logwrap::prelude::*;
/// # let logger = Logger::default();
/// use logwrap::fatal;
/// fatal!(logger, "Critical system failure");
/// fatal!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}

/// Log `result`'s error with a formatted message and wrap it.
///
/// Expands to [`Logger::wrap_errf`](crate::Logger::wrap_errf).
///
/// # Examples
///
/// ```
/// # use logwrap::prelude::*;
/// use logwrap::wrap_errf;
///
/// let logger = Logger::disabled();
/// let host = "db.internal";
/// let result: Result<(), std::io::Error> = Err(std::io::Error::other("refused"));
/// let err = wrap_errf!(logger, result, "failed to connect to {}", host).unwrap_err();
/// assert_eq!(err.to_string(), "failed to connect to db.internal: refused");
/// ```
#[macro_export]
macro_rules! wrap_errf {
    ($logger:expr, $result:expr, $($arg:tt)+) => {
        $logger.wrap_errf($result, format_args!($($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use crate::appenders::SharedBuffer;
    use crate::core::{Config, LogLevel, Logger};

    fn buffered(level: &str) -> (Logger, SharedBuffer) {
        let buffer = SharedBuffer::new();
        let logger = Logger::new(Config {
            level: level.to_string(),
            format: "json".to_string(),
            output: Some(buffer.clone().into()),
            caller: true,
            ..Config::default()
        });
        (logger, buffer)
    }

    #[test]
    fn test_log_macro() {
        let (logger, buffer) = buffered("info");
        log!(logger, LogLevel::Info, "Test message");
        log!(logger, LogLevel::Info, "Formatted: {}", 42);
        assert!(buffer.contents().contains("Formatted: 42"));
    }

    #[test]
    fn test_level_macros() {
        let (logger, buffer) = buffered("trace");
        trace!(logger, "Value: {}", 10);
        debug!(logger, "Count: {}", 5);
        info!(logger, "Items: {}", 100);
        warn!(logger, "Retry {} of {}", 1, 3);
        error!(logger, "Code: {}", 500);
        fatal!(logger, "Critical failure: {}", "system");

        let levels: Vec<String> = buffer
            .lines()
            .iter()
            .map(|line| serde_json::from_str::<serde_json::Value>(line).unwrap()["level"].to_string())
            .collect();
        assert_eq!(
            levels,
            vec!["\"trace\"", "\"debug\"", "\"info\"", "\"warn\"", "\"error\"", "\"fatal\""]
        );
    }

    #[test]
    fn test_filtered_macro_writes_nothing() {
        let (logger, buffer) = buffered("error");
        debug!(logger, "Debug message");
        assert!(buffer.contents().is_empty());
    }

    #[test]
    fn test_macro_records_call_site() {
        let (logger, buffer) = buffered("info");
        info!(logger, "located");
        let parsed: serde_json::Value = serde_json::from_str(&buffer.lines()[0]).unwrap();
        assert!(parsed["caller"].as_str().unwrap().starts_with(file!()));
    }
}
