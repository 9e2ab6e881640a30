//! Core logger types and traits

pub mod appender;
pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod field_value;
pub mod fields;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod output_format;
pub mod timestamp;
pub mod wrap;

pub use appender::{Appender, Hook};
pub use config::{parse_level, Config, FileConfig, FileGuard};
pub use context::{
    ctx_with_field, ctx_with_fields, ctx_with_struct, from_ctx, from_ctx_with_field,
    from_ctx_with_fields, from_ctx_with_struct, with_ctx, Context,
};
pub use error::{BoxError, LoggerError, Result, WrappedError};
pub use extract::{extract_fields, to_snake_case, LogFields, Member, StructFields, ToField};
pub use field_value::FieldValue;
pub use fields::{
    FieldSet, FIELD_COMPONENT, FIELD_DURATION, FIELD_ERROR, FIELD_REQUEST_ID, FIELD_SPAN_ID,
    FIELD_TRACE_ID, FIELD_USER_ID,
};
pub use log_entry::LogEntry;
pub use log_level::LogLevel;
pub use logger::{Event, Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use output_format::OutputFormat;
pub use timestamp::TimestampFormat;
pub use wrap::ResultExt;
