//! Shared output destinations
//!
//! A [`Sink`] is a cloneable handle to a writer. Every clone writes through
//! the same lock, so a sink can be shared between appenders and loggers and
//! each rendered line reaches the writer in one piece.

use parking_lot::Mutex;
use std::fmt;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

/// Cloneable, lock-protected writer handle
#[derive(Clone)]
pub struct Sink {
    name: &'static str,
    inner: Arc<Mutex<dyn Write + Send>>,
    terminal: bool,
}

impl Sink {
    /// Wrap any writer
    pub fn new<W>(writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self::from_shared(Arc::new(Mutex::new(writer)))
    }

    /// Write through a writer that is also held elsewhere
    pub fn from_shared<W>(writer: Arc<Mutex<W>>) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            name: "writer",
            inner: writer,
            terminal: false,
        }
    }

    /// The process's standard error stream
    pub fn stderr() -> Self {
        Self {
            name: "stderr",
            inner: Arc::new(Mutex::new(io::stderr())),
            terminal: io::stderr().is_terminal(),
        }
    }

    /// The process's standard output stream
    pub fn stdout() -> Self {
        Self {
            name: "stdout",
            inner: Arc::new(Mutex::new(io::stdout())),
            terminal: io::stdout().is_terminal(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the sink is an interactive terminal (enables colours)
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Write `line` followed by a newline as one write under a single lock
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut record = String::with_capacity(line.len() + 1);
        record.push_str(line);
        record.push('\n');
        self.inner.lock().write_all(record.as_bytes())
    }

    pub fn flush(&self) -> io::Result<()> {
        self.inner.lock().flush()
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("name", &self.name)
            .field("terminal", &self.terminal)
            .finish()
    }
}

/// In-memory writer whose clones share one buffer
///
/// ```
/// use logwrap::{Config, Logger, SharedBuffer};
///
/// let buffer = SharedBuffer::new();
/// let logger = Logger::new(Config {
///     format: "json".into(),
///     output: Some(buffer.clone().into()),
///     ..Config::default()
/// });
/// logger.info("ready");
/// assert!(buffer.contents().contains("\"message\":\"ready\""));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(String::from).collect()
    }

    pub fn clear(&self) {
        self.bytes.lock().clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl From<SharedBuffer> for Sink {
    fn from(buffer: SharedBuffer) -> Self {
        Sink {
            name: "buffer",
            ..Sink::new(buffer)
        }
    }
}
