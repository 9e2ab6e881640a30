//! Main logger implementation
//!
//! A [`Logger`] is a cheap, cloneable handle. The appenders and metrics live
//! in a shared core that is fixed once the logger is built; the handle itself
//! carries the minimum level, attached fields, hooks and the caller flag.
//! Enrichment never mutates a handle, it returns a new one.

use super::{
    appender::{Appender, Hook},
    context::Context,
    error::Result,
    extract::{extract_fields, LogFields},
    field_value::FieldValue,
    fields::{FieldSet, FIELD_ERROR},
    log_entry::LogEntry,
    log_level::LogLevel,
    metrics::LoggerMetrics,
};
use parking_lot::Mutex;
use std::fmt;
use std::panic::{self, AssertUnwindSafe, Location};
use std::sync::Arc;

/// Shared, build-time-fixed part of a logger
struct LoggerCore {
    appenders: Mutex<Vec<Box<dyn Appender>>>,
    metrics: LoggerMetrics,
}

impl LoggerCore {
    fn new(appenders: Vec<Box<dyn Appender>>) -> Self {
        Self {
            appenders: Mutex::new(appenders),
            metrics: LoggerMetrics::new(),
        }
    }

    /// Write an entry to every appender
    ///
    /// **Per-Appender Panic Isolation**: each appender is wrapped in
    /// catch_unwind so a failing or panicking appender cannot keep the
    /// others from receiving the entry.
    fn dispatch(&self, entry: &LogEntry) -> bool {
        let mut appenders = self.appenders.lock();
        let mut has_error = false;

        for (idx, appender) in appenders.iter_mut().enumerate() {
            let append_result = panic::catch_unwind(AssertUnwindSafe(|| appender.append(entry)));

            match append_result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!(
                        "[LOGGER ERROR] Appender #{} ({}) failed: {}",
                        idx,
                        appender.name(),
                        e
                    );
                    has_error = true;
                }
                Err(panic_info) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Appender #{} panicked: {}. \
                         Other appenders continue to function.",
                        idx,
                        panic_message(panic_info.as_ref())
                    );
                    has_error = true;
                }
            }
        }

        if has_error {
            self.metrics.record_dropped();
        } else {
            self.metrics.record_logged();
        }

        has_error
    }

    fn flush(&self) -> Result<()> {
        let mut appenders = self.appenders.lock();
        let mut first_error = None;

        for (idx, appender) in appenders.iter_mut().enumerate() {
            if let Err(e) = appender.flush() {
                eprintln!("[LOGGER ERROR] Appender #{} flush failed: {}", idx, e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Leveled, field-carrying logger handle
///
/// # Example
///
/// ```
/// use logwrap::prelude::*;
///
/// let buffer = SharedBuffer::new();
/// let logger = Logger::builder()
///     .min_level(LogLevel::Debug)
///     .appender(JsonAppender::new(buffer.clone()))
///     .build()
///     .with_field("component", "billing");
///
/// logger.debug("charging card");
/// logger.event(LogLevel::Warn).field("attempt", 2).msg("retrying");
///
/// assert_eq!(buffer.lines().len(), 2);
/// ```
#[derive(Clone)]
pub struct Logger {
    core: Option<Arc<LoggerCore>>,
    min_level: LogLevel,
    fields: Arc<FieldSet>,
    hooks: Arc<Vec<Arc<dyn Hook>>>,
    caller: bool,
}

impl Logger {
    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use logwrap::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .min_level(LogLevel::Debug)
    ///     .appender(ConsoleAppender::new())
    ///     .caller(true)
    ///     .build();
    /// assert_eq!(logger.level(), LogLevel::Debug);
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// A logger that discards everything
    pub fn disabled() -> Self {
        Self {
            core: None,
            min_level: LogLevel::Disabled,
            fields: Arc::new(FieldSet::new()),
            hooks: Arc::new(Vec::new()),
            caller: false,
        }
    }

    /// Minimum level; `Disabled` for a no-op logger
    pub fn level(&self) -> LogLevel {
        if self.core.is_some() {
            self.min_level
        } else {
            LogLevel::Disabled
        }
    }

    /// Fields attached to every entry
    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    /// Whether anything can be emitted through this logger
    pub fn is_enabled(&self) -> bool {
        self.level() != LogLevel::Disabled
    }

    /// Whether an entry at `level` would be emitted
    pub fn enabled_for(&self, level: LogLevel) -> bool {
        self.is_enabled() && level != LogLevel::Disabled && level >= self.min_level
    }

    pub fn has_caller(&self) -> bool {
        self.caller
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    /// Counters of the shared core; `None` for a disabled logger
    pub fn metrics(&self) -> Option<&LoggerMetrics> {
        self.core.as_deref().map(|core| &core.metrics)
    }

    /// A copy carrying one more field
    #[must_use]
    pub fn with_field<K, V>(&self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let mut fields = (*self.fields).clone();
        fields.add_field(key, value);
        Self {
            fields: Arc::new(fields),
            ..self.clone()
        }
    }

    /// A copy carrying `fields`; existing keys are replaced
    #[must_use]
    pub fn with_fields(&self, fields: &FieldSet) -> Self {
        if fields.is_empty() {
            return self.clone();
        }
        let mut merged = (*self.fields).clone();
        merged.merge(fields);
        Self {
            fields: Arc::new(merged),
            ..self.clone()
        }
    }

    /// A copy carrying the fields described by `value`
    #[must_use]
    pub fn with_struct<T>(&self, value: &T) -> Self
    where
        T: LogFields + ?Sized,
    {
        self.with_fields(&extract_fields(value))
    }

    /// A copy with a different minimum level
    #[must_use]
    pub fn with_level(&self, level: LogLevel) -> Self {
        Self {
            min_level: level,
            ..self.clone()
        }
    }

    /// A copy that also runs `hook` on every emitted entry
    #[must_use]
    pub fn with_hook<H>(&self, hook: H) -> Self
    where
        H: Hook + 'static,
    {
        let mut hooks = (*self.hooks).clone();
        hooks.push(Arc::new(hook));
        Self {
            hooks: Arc::new(hooks),
            ..self.clone()
        }
    }

    /// A copy that records the `file:line` of each log statement
    #[must_use]
    pub fn with_caller(&self, caller: bool) -> Self {
        Self {
            caller,
            ..self.clone()
        }
    }

    /// Start an entry at `level`
    #[track_caller]
    pub fn event(&self, level: LogLevel) -> Event<'_> {
        Event {
            logger: self,
            level,
            fields: FieldSet::new(),
            context: None,
            location: if self.caller {
                Some(Location::caller())
            } else {
                None
            },
        }
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.event(level).msg(message);
    }

    #[track_caller]
    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    /// Log at fatal level. The process keeps running.
    #[track_caller]
    pub fn fatal(&self, message: impl Into<String>) {
        self.log(LogLevel::Fatal, message);
    }

    /// Log at panic level. No panic is raised.
    #[track_caller]
    pub fn panic(&self, message: impl Into<String>) {
        self.log(LogLevel::Panic, message);
    }

    /// Log `err` at error level under the `error` field
    #[track_caller]
    pub fn log_error<E>(&self, err: &E, message: impl Into<String>)
    where
        E: std::error::Error + ?Sized,
    {
        self.event(LogLevel::Error).err(err).msg(message);
    }

    /// Flush every appender
    pub fn flush(&self) -> Result<()> {
        match &self.core {
            Some(core) => core.flush(),
            None => Ok(()),
        }
    }

    fn emit(
        &self,
        level: LogLevel,
        message: String,
        fields: FieldSet,
        context: Option<Context>,
        location: Option<&'static Location<'static>>,
    ) {
        let Some(core) = self.core.as_deref() else {
            return;
        };

        let mut merged = (*self.fields).clone();
        merged.merge(&fields);

        let mut entry = LogEntry::new(level, message).with_fields(merged);
        if let Some(location) = location {
            entry = entry.with_location(location.file(), location.line());
        }
        if let Some(context) = context {
            entry = entry.with_context(context);
        }

        core.dispatch(&entry);

        for hook in self.hooks.iter() {
            if let Err(panic_info) = panic::catch_unwind(AssertUnwindSafe(|| hook.run(&entry))) {
                eprintln!(
                    "[LOGGER ERROR] Hook panicked: {}",
                    panic_message(panic_info.as_ref())
                );
            }
            core.metrics.record_hook_run();
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Logger::new(super::config::Config::default())
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("fields", &self.fields)
            .field("hooks", &self.hooks.len())
            .field("caller", &self.caller)
            .finish()
    }
}

/// A log entry under construction
///
/// Nothing is written until [`Event::msg`] is called.
#[must_use = "an event is only emitted by calling `msg`"]
pub struct Event<'a> {
    logger: &'a Logger,
    level: LogLevel,
    fields: FieldSet,
    context: Option<Context>,
    location: Option<&'static Location<'static>>,
}

impl<'a> Event<'a> {
    /// Whether `msg` would write anything
    pub fn enabled(&self) -> bool {
        self.logger.enabled_for(self.level)
    }

    pub fn field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        if self.enabled() {
            self.fields.add_field(key, value);
        }
        self
    }

    pub fn fields(mut self, fields: &FieldSet) -> Self {
        if self.enabled() {
            self.fields.merge(fields);
        }
        self
    }

    /// Attach `err`'s message under the `error` field
    pub fn err<E>(self, err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let message = err.to_string();
        self.field(FIELD_ERROR, FieldValue::Error(message))
    }

    /// Emit under `ctx`; hooks can read values stored in it
    pub fn ctx(mut self, ctx: &Context) -> Self {
        self.context = Some(ctx.clone());
        self
    }

    pub fn msg(self, message: impl Into<String>) {
        if !self.enabled() {
            return;
        }
        self.logger
            .emit(self.level, message.into(), self.fields, self.context, self.location);
    }

    /// Emit with a formatted message
    pub fn msgf(self, args: fmt::Arguments<'_>) {
        if !self.enabled() {
            return;
        }
        self.msg(fmt::format(args));
    }
}

/// Builder for [`Logger`]
pub struct LoggerBuilder {
    min_level: LogLevel,
    appenders: Vec<Box<dyn Appender>>,
    hooks: Vec<Arc<dyn Hook>>,
    fields: FieldSet,
    caller: bool,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Info,
            appenders: Vec::new(),
            hooks: Vec::new(),
            fields: FieldSet::new(),
            caller: false,
        }
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Add an appender
    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(Box::new(appender));
        self
    }

    /// Add an already boxed appender
    #[must_use = "builder methods return a new value"]
    pub fn boxed_appender(mut self, appender: Box<dyn Appender>) -> Self {
        self.appenders.push(appender);
        self
    }

    /// Register a hook run on every emitted entry
    #[must_use = "builder methods return a new value"]
    pub fn hook<H: Hook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.fields.add_field(key, value);
        self
    }

    /// Record the `file:line` of each log statement
    #[must_use = "builder methods return a new value"]
    pub fn caller(mut self, enabled: bool) -> Self {
        self.caller = enabled;
        self
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        Logger {
            core: Some(Arc::new(LoggerCore::new(self.appenders))),
            min_level: self.min_level,
            fields: Arc::new(self.fields),
            hooks: Arc::new(self.hooks),
            caller: self.caller,
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::LoggerError;

    #[derive(Clone, Default)]
    struct Collect(Arc<Mutex<Vec<LogEntry>>>);

    impl Collect {
        fn entries(&self) -> Vec<LogEntry> {
            self.0.lock().clone()
        }
    }

    impl Appender for Collect {
        fn append(&mut self, entry: &LogEntry) -> Result<()> {
            self.0.lock().push(entry.clone());
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "collect"
        }
    }

    struct Failing;

    impl Appender for Failing {
        fn append(&mut self, _entry: &LogEntry) -> Result<()> {
            Err(LoggerError::writer("sink closed"))
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct Panicking;

    impl Appender for Panicking {
        fn append(&mut self, _entry: &LogEntry) -> Result<()> {
            panic!("appender exploded");
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    fn collecting(level: LogLevel) -> (Logger, Collect) {
        let sink = Collect::default();
        let logger = Logger::builder()
            .min_level(level)
            .appender(sink.clone())
            .build();
        (logger, sink)
    }

    #[test]
    fn test_builder_default() {
        let logger = LoggerBuilder::default().build();
        assert_eq!(logger.level(), LogLevel::Info);
        assert!(logger.is_enabled());
        assert!(!logger.has_caller());
        assert!(logger.fields().is_empty());
    }

    #[test]
    fn test_level_filtering() {
        let (logger, sink) = collecting(LogLevel::Warn);

        logger.debug("hidden");
        logger.info("hidden");
        logger.warn("shown");
        logger.error("shown");

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, LogLevel::Warn);
        assert_eq!(logger.metrics().unwrap().total_logged(), 2);
    }

    #[test]
    fn test_disabled_logger_emits_nothing() {
        let logger = Logger::disabled().with_field("a", 1);
        logger.error("nothing");
        assert!(!logger.is_enabled());
        assert!(logger.metrics().is_none());
        assert!(logger.flush().is_ok());
    }

    #[test]
    fn test_disabled_level_silences_core() {
        let (logger, sink) = collecting(LogLevel::Disabled);
        logger.panic("nothing");
        assert!(!logger.is_enabled());
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn test_enrichment_is_copy_on_write() {
        let (base, sink) = collecting(LogLevel::Info);
        let enriched = base.with_field("request_id", "r-1");

        base.info("plain");
        enriched.info("enriched");

        let entries = sink.entries();
        assert!(entries[0].fields.is_empty());
        assert_eq!(
            entries[1].fields.get("request_id"),
            Some(&FieldValue::Str("r-1".to_string()))
        );
        assert!(base.fields().is_empty());
    }

    #[test]
    fn test_event_fields_override_logger_fields() {
        let (logger, sink) = collecting(LogLevel::Info);
        logger
            .with_field("attempt", 1)
            .event(LogLevel::Info)
            .field("attempt", 2)
            .msg("retry");

        let entries = sink.entries();
        assert_eq!(entries[0].fields.get("attempt"), Some(&FieldValue::I32(2)));
        assert_eq!(entries[0].fields.len(), 1);
    }

    #[test]
    fn test_err_field() {
        let (logger, sink) = collecting(LogLevel::Info);
        let err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        logger.log_error(&err, "write failed");

        let entries = sink.entries();
        assert_eq!(entries[0].level, LogLevel::Error);
        assert_eq!(
            entries[0].fields.get(FIELD_ERROR),
            Some(&FieldValue::Error("disk full".to_string()))
        );
    }

    #[test]
    fn test_caller_location() {
        let (logger, sink) = collecting(LogLevel::Info);
        logger.with_caller(true).info("here");
        logger.info("no caller");

        let entries = sink.entries();
        let caller = entries[0].caller().expect("caller recorded");
        assert!(caller.starts_with(file!()), "caller was {}", caller);
        assert!(entries[1].caller().is_none());
    }

    #[test]
    fn test_with_level_returns_copy() {
        let (logger, sink) = collecting(LogLevel::Info);
        let verbose = logger.with_level(LogLevel::Trace);

        logger.trace("hidden");
        verbose.trace("shown");

        assert_eq!(sink.entries().len(), 1);
        assert_eq!(logger.level(), LogLevel::Info);
    }

    #[test]
    fn test_hooks_run_per_entry() {
        let (logger, sink) = collecting(LogLevel::Info);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_by_hook = seen.clone();
        let hooked = logger.with_hook(move |entry: &LogEntry| {
            seen_by_hook.lock().push(entry.message.clone());
        });

        hooked.info("one");
        hooked.debug("filtered");
        logger.info("unhooked");

        assert_eq!(*seen.lock(), vec!["one".to_string()]);
        assert_eq!(sink.entries().len(), 2);
        assert_eq!(hooked.metrics().unwrap().hook_runs(), 1);
    }

    #[test]
    fn test_failing_appender_is_isolated() {
        let sink = Collect::default();
        let logger = Logger::builder()
            .appender(Failing)
            .appender(Panicking)
            .appender(sink.clone())
            .build();

        logger.info("still delivered");

        assert_eq!(sink.entries().len(), 1);
        let metrics = logger.metrics().unwrap();
        assert_eq!(metrics.dropped_count(), 1);
        assert_eq!(metrics.total_logged(), 0);
    }

    #[test]
    fn test_context_travels_with_entry() {
        #[derive(Debug, PartialEq)]
        struct TraceTag(&'static str);

        let (logger, sink) = collecting(LogLevel::Info);
        let ctx = Context::background().with_value(TraceTag("t-9"));
        logger.event(LogLevel::Info).ctx(&ctx).msg("traced");

        let entries = sink.entries();
        let context = entries[0].context.as_ref().expect("context attached");
        assert_eq!(context.value::<TraceTag>(), Some(&TraceTag("t-9")));
    }

    #[test]
    fn test_msgf() {
        let (logger, sink) = collecting(LogLevel::Info);
        logger.event(LogLevel::Info).msgf(format_args!("{} + {}", 1, 2));
        assert_eq!(sink.entries()[0].message, "1 + 2");
    }
}
