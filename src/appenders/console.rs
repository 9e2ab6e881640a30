//! Console appender implementation

use super::sink::Sink;
use crate::core::{Appender, LogEntry, OutputFormat, Result, TimestampFormat};

/// Human-readable appender, writing to stderr unless told otherwise
///
/// Level names are coloured when the sink is a terminal and the `console`
/// feature is enabled.
pub struct ConsoleAppender {
    sink: Sink,
    use_colors: bool,
    timestamp_format: TimestampFormat,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self::with_sink(Sink::stderr())
    }

    /// Write to `sink`; colours follow whether it is a terminal
    pub fn with_sink(sink: impl Into<Sink>) -> Self {
        let sink = sink.into();
        Self {
            use_colors: sink.is_terminal(),
            sink,
            timestamp_format: TimestampFormat::default(),
        }
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Set the timestamp format for this appender
    ///
    /// # Examples
    ///
    /// ```
    /// use logwrap::appenders::ConsoleAppender;
    /// use logwrap::TimestampFormat;
    ///
    /// let appender = ConsoleAppender::new()
    ///     .with_timestamp_format(TimestampFormat::Iso8601Micros);
    /// ```
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Set a custom timestamp format using a strftime-compatible format string
    #[must_use]
    pub fn with_custom_timestamp(mut self, format_str: &str) -> Self {
        self.timestamp_format = TimestampFormat::Custom(format_str.to_string());
        self
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        let output = OutputFormat::Console.format(entry, &self.timestamp_format, self.use_colors);
        self.sink.write_line(&output)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
