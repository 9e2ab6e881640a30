//! # logwrap
//!
//! Structured logging with context-carried loggers, typed fields and
//! configuration-driven setup.
//!
//! ## Features
//!
//! - **Context Propagation**: bind a [`Logger`] to a [`Context`] and pull it
//!   back out anywhere down the call graph
//! - **Typed Fields**: attach fields one at a time, as a [`FieldSet`], or
//!   extracted from a struct via [`log_fields!`]
//! - **Console or JSON**: chosen by [`Config`], with an optional rotating,
//!   compressed log file
//! - **Error Wrapping**: log an error and return it with context in one call
//! - **OpenTelemetry**: forward every entry to an OpenTelemetry log pipeline
//!   (feature `otel`)
//!
//! ## Example
//!
//! ```
//! use logwrap::prelude::*;
//!
//! let buffer = SharedBuffer::new();
//! let logger = Logger::new(Config {
//!     level: "debug".into(),
//!     format: "json".into(),
//!     output: Some(buffer.clone().into()),
//!     ..Config::default()
//! });
//!
//! let ctx = with_ctx(&Context::background(), logger);
//! let ctx = ctx_with_field(&ctx, "request_id", "r-42");
//!
//! from_ctx(&ctx).info("handling request");
//! assert!(buffer.contents().contains("\"request_id\":\"r-42\""));
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

#[cfg(feature = "otel")]
pub mod otel;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, JsonAppender, SharedBuffer, Sink};
    pub use crate::core::{
        ctx_with_field, ctx_with_fields, ctx_with_struct, extract_fields, from_ctx,
        from_ctx_with_field, from_ctx_with_fields, from_ctx_with_struct, with_ctx, Appender,
        Config, Context, FieldSet, FieldValue, FileConfig, FileGuard, Hook, LogEntry, LogFields,
        LogLevel, Logger, LoggerBuilder, LoggerError, ResultExt, StructFields, WrappedError,
    };
}

pub use appenders::{
    ConsoleAppender, JsonAppender, RotatingFile, RotationPolicy, SharedBuffer, Sink,
};
pub use core::{
    ctx_with_field, ctx_with_fields, ctx_with_struct, extract_fields, from_ctx,
    from_ctx_with_field, from_ctx_with_fields, from_ctx_with_struct, parse_level, to_snake_case,
    with_ctx, Appender, BoxError, Config, Context, Event, FieldSet, FieldValue, FileConfig,
    FileGuard, Hook, LogEntry, LogFields, LogLevel, Logger, LoggerBuilder, LoggerError,
    LoggerMetrics, Member, OutputFormat, Result, ResultExt, StructFields, TimestampFormat,
    ToField, WrappedError, FIELD_COMPONENT, FIELD_DURATION, FIELD_ERROR, FIELD_REQUEST_ID,
    FIELD_SPAN_ID, FIELD_TRACE_ID, FIELD_USER_ID,
};
