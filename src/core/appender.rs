//! Appender and hook traits

use super::{error::Result, log_entry::LogEntry};

/// Formats entries and writes them to a destination
pub trait Appender: Send + Sync {
    fn append(&mut self, entry: &LogEntry) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}

/// Observer invoked synchronously on every emitted entry, alongside the
/// appenders. A hook must not fail the log statement that triggered it.
pub trait Hook: Send + Sync {
    fn run(&self, entry: &LogEntry);
}

impl<F> Hook for F
where
    F: Fn(&LogEntry) + Send + Sync,
{
    fn run(&self, entry: &LogEntry) {
        self(entry)
    }
}
