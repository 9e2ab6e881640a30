//! Log-and-wrap helpers for error paths
//!
//! Each helper emits exactly one error-level entry carrying the failure under
//! the `error` field, then returns a [`WrappedError`] whose message is
//! `"{message}: {source}"`. `Ok` values pass through without logging.
//!
//! ```
//! use logwrap::{Logger, ResultExt};
//!
//! fn connect(logger: &Logger) -> Result<(), logwrap::WrappedError> {
//!     let attempt: Result<(), std::io::Error> = Err(std::io::Error::other("refused"));
//!     attempt.log_wrap(logger, "failed to connect")
//! }
//!
//! let err = connect(&Logger::disabled()).unwrap_err();
//! assert_eq!(err.to_string(), "failed to connect: refused");
//! ```

use super::{
    error::{BoxError, WrappedError},
    fields::FieldSet,
    log_level::LogLevel,
    logger::Logger,
};
use std::fmt;

impl Logger {
    /// Log `result`'s error and wrap it with `message`
    #[track_caller]
    pub fn wrap_err<T, E>(
        &self,
        result: std::result::Result<T, E>,
        message: impl Into<String>,
    ) -> std::result::Result<T, WrappedError>
    where
        E: Into<BoxError>,
    {
        match result {
            Ok(value) => Ok(value),
            Err(err) => Err(self.log_and_wrap(err.into(), message.into())),
        }
    }

    /// Like [`Logger::wrap_err`], with `fields` attached to the entry
    #[track_caller]
    pub fn wrap_err_with_fields<T, E>(
        &self,
        result: std::result::Result<T, E>,
        message: impl Into<String>,
        fields: &FieldSet,
    ) -> std::result::Result<T, WrappedError>
    where
        E: Into<BoxError>,
    {
        match result {
            Ok(value) => Ok(value),
            Err(err) => Err(self
                .with_fields(fields)
                .log_and_wrap(err.into(), message.into())),
        }
    }

    /// Like [`Logger::wrap_err`], with a formatted message
    ///
    /// Usually called through [`wrap_errf!`](crate::wrap_errf).
    #[track_caller]
    pub fn wrap_errf<T, E>(
        &self,
        result: std::result::Result<T, E>,
        args: fmt::Arguments<'_>,
    ) -> std::result::Result<T, WrappedError>
    where
        E: Into<BoxError>,
    {
        match result {
            Ok(value) => Ok(value),
            Err(err) => Err(self.log_and_wrap(err.into(), fmt::format(args))),
        }
    }

    #[track_caller]
    fn log_and_wrap(&self, err: BoxError, message: String) -> WrappedError {
        self.event(LogLevel::Error).err(err.as_ref()).msg(message.as_str());
        WrappedError::new(message, err)
    }
}

/// Method-chain form of [`Logger::wrap_err`]
pub trait ResultExt<T> {
    fn log_wrap(
        self,
        logger: &Logger,
        message: impl Into<String>,
    ) -> std::result::Result<T, WrappedError>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<BoxError>,
{
    #[track_caller]
    fn log_wrap(
        self,
        logger: &Logger,
        message: impl Into<String>,
    ) -> std::result::Result<T, WrappedError> {
        logger.wrap_err(self, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appenders::{JsonAppender, SharedBuffer};
    use std::error::Error as _;
    use std::io;

    fn json_logger() -> (Logger, SharedBuffer) {
        let buffer = SharedBuffer::new();
        let logger = Logger::builder()
            .appender(JsonAppender::new(buffer.clone()))
            .build();
        (logger, buffer)
    }

    fn failure() -> std::result::Result<u32, io::Error> {
        Err(io::Error::new(io::ErrorKind::ConnectionRefused, "Y"))
    }

    #[test]
    fn test_ok_passes_through_silently() {
        let (logger, buffer) = json_logger();
        let value = logger.wrap_err(Ok::<_, io::Error>(7), "unused").unwrap();
        assert_eq!(value, 7);
        assert!(buffer.contents().is_empty());
    }

    #[test]
    fn test_wrap_err_logs_once() {
        let (logger, buffer) = json_logger();
        let err = logger.wrap_err(failure(), "X").unwrap_err();

        assert_eq!(err.to_string(), "X: Y");
        let source = err.source().expect("source kept");
        assert_eq!(
            source.downcast_ref::<io::Error>().map(|e| e.kind()),
            Some(io::ErrorKind::ConnectionRefused)
        );

        let lines = buffer.lines();
        assert_eq!(lines.len(), 1);
        let parsed: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(parsed["level"], "error");
        assert_eq!(parsed["message"], "X");
        assert_eq!(parsed["error"], "Y");
    }

    #[test]
    fn test_wrap_err_with_fields() {
        let (logger, buffer) = json_logger();
        let fields = FieldSet::new().with_field("id", 17);
        let err = logger
            .wrap_err_with_fields(failure(), "query failed", &fields)
            .unwrap_err();

        assert_eq!(err.message(), "query failed");
        let parsed: serde_json::Value = serde_json::from_str(&buffer.lines()[0]).unwrap();
        assert_eq!(parsed["id"], 17);
        assert!(logger.fields().is_empty());
    }

    #[test]
    fn test_wrap_errf_macro() {
        let (logger, buffer) = json_logger();
        let host = "db.internal";
        let err = crate::wrap_errf!(logger, failure(), "failed to connect to {}", host).unwrap_err();

        assert_eq!(err.to_string(), "failed to connect to db.internal: Y");
        assert!(buffer.contents().contains("failed to connect to db.internal"));
    }

    #[test]
    fn test_string_errors_and_result_ext() {
        let (logger, buffer) = json_logger();
        let err = Err::<(), _>("plain text").log_wrap(&logger, "step").unwrap_err();

        assert_eq!(err.to_string(), "step: plain text");
        assert_eq!(err.into_inner().to_string(), "plain text");
        assert_eq!(buffer.lines().len(), 1);
    }

    #[test]
    fn test_disabled_logger_still_wraps() {
        let err = Logger::disabled().wrap_err(failure(), "X").unwrap_err();
        assert_eq!(err.to_string(), "X: Y");
    }
}
