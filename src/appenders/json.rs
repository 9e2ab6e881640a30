//! JSON appender for structured logging

use super::sink::Sink;
use crate::core::{Appender, LogEntry, OutputFormat, Result, TimestampFormat};

/// JSON appender for structured logging
///
/// Writes each log entry as a single-line JSON object (JSONL format)
/// Compatible with log aggregation tools like ELK, Loki, etc.
pub struct JsonAppender {
    sink: Sink,
    timestamp_format: TimestampFormat,
}

impl JsonAppender {
    /// Create a new JSON appender writing to `sink`
    pub fn new(sink: impl Into<Sink>) -> Self {
        Self {
            sink: sink.into(),
            timestamp_format: TimestampFormat::default(),
        }
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }
}

impl Appender for JsonAppender {
    fn name(&self) -> &str {
        "json"
    }

    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        let json = OutputFormat::Json.format(entry, &self.timestamp_format, false);
        self.sink.write_line(&json)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }
}
