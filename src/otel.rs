//! OpenTelemetry log bridge
//!
//! [`OtelHook`] is a [`Hook`] that forwards every emitted entry to an
//! OpenTelemetry logger: the message becomes the record body, the level its
//! severity, and attached fields become attributes. The exporting pipeline
//! (batching, transport, retries) belongs to the OpenTelemetry SDK.
//!
//! ```
//! use logwrap::otel::OtelHook;
//! use logwrap::Logger;
//!
//! let logger = Logger::default().with_hook(OtelHook::new("checkout"));
//! logger.info("order placed");
//! ```

use crate::core::{Context, FieldValue, Hook, LogEntry, LogLevel};
use opentelemetry::logs::{
    AnyValue, LogRecord, Logger as OtelLogger, LoggerProvider, NoopLoggerProvider, Severity,
};
use std::time::SystemTime;

/// Logger type used when no provider is supplied
pub type NoopOtelLogger = <NoopLoggerProvider as LoggerProvider>::Logger;

/// Hook emitting entries as OpenTelemetry log records
pub struct OtelHook<L = NoopOtelLogger> {
    logger: Option<L>,
}

impl OtelHook<NoopOtelLogger> {
    /// Hook on the no-op provider
    ///
    /// OpenTelemetry for Rust keeps no process-wide logs provider, so records
    /// go nowhere until a real provider is passed to
    /// [`OtelHook::with_provider`].
    pub fn new(service_name: &str) -> Self {
        Self::with_provider(&NoopLoggerProvider::new(), service_name)
    }

    /// Hook that drops every entry
    pub fn disabled() -> Self {
        Self { logger: None }
    }
}

impl<L> OtelHook<L>
where
    L: OtelLogger,
{
    /// Hook emitting through `provider`'s logger named `service_name`
    pub fn with_provider<P>(provider: &P, service_name: &str) -> Self
    where
        P: LoggerProvider<Logger = L>,
    {
        Self {
            logger: Some(provider.logger(service_name.to_string())),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.logger.is_some()
    }
}

impl<L> Hook for OtelHook<L>
where
    L: OtelLogger + Send + Sync,
{
    fn run(&self, entry: &LogEntry) {
        let Some(logger) = &self.logger else {
            return;
        };

        let _attached = otel_context(entry.context.as_ref()).attach();

        let mut record = logger.create_log_record();
        record.set_timestamp(SystemTime::from(entry.timestamp));
        record.set_body(AnyValue::from(entry.message.clone()));
        record.set_severity_number(severity(entry.level));
        record.set_severity_text(entry.level.name());
        for (key, value) in entry.fields.iter() {
            record.add_attribute(key.to_string(), attribute_value(value));
        }

        logger.emit(record);
    }
}

/// A context carrying `otel`, so entries emitted under it are correlated
/// with the active span
#[must_use]
pub fn with_otel_context(ctx: &Context, otel: opentelemetry::Context) -> Context {
    ctx.with_value(otel)
}

fn otel_context(ctx: Option<&Context>) -> opentelemetry::Context {
    ctx.and_then(|c| c.value::<opentelemetry::Context>())
        .cloned()
        .unwrap_or_else(opentelemetry::Context::current)
}

/// Map a level onto the OpenTelemetry severity scale
pub fn severity(level: LogLevel) -> Severity {
    match level {
        LogLevel::Trace => Severity::Trace,
        LogLevel::Debug => Severity::Debug,
        LogLevel::Info => Severity::Info,
        LogLevel::Warn => Severity::Warn,
        LogLevel::Error => Severity::Error,
        LogLevel::Fatal => Severity::Fatal,
        LogLevel::Panic => Severity::Fatal4,
        LogLevel::Disabled => Severity::Info,
    }
}

fn attribute_value(value: &FieldValue) -> AnyValue {
    match value {
        FieldValue::Str(s) | FieldValue::Error(s) => AnyValue::from(s.clone()),
        FieldValue::Bool(b) => AnyValue::from(*b),
        FieldValue::I8(n) => AnyValue::from(i64::from(*n)),
        FieldValue::I16(n) => AnyValue::from(i64::from(*n)),
        FieldValue::I32(n) => AnyValue::from(i64::from(*n)),
        FieldValue::I64(n) => AnyValue::from(*n),
        FieldValue::U8(n) => AnyValue::from(i64::from(*n)),
        FieldValue::U16(n) => AnyValue::from(i64::from(*n)),
        FieldValue::U32(n) => AnyValue::from(i64::from(*n)),
        FieldValue::U64(n) => match i64::try_from(*n) {
            Ok(n) => AnyValue::from(n),
            Err(_) => AnyValue::from(n.to_string()),
        },
        FieldValue::F32(n) => AnyValue::from(f64::from(*n)),
        FieldValue::F64(n) => AnyValue::from(*n),
        other => AnyValue::from(other.to_string()),
    }
}
