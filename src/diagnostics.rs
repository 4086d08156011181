//! Diagnostics Channel
//!
//! Buffers never log through global state. Each one carries a [`LogChannel`]:
//! a named handle onto a [`LogSink`] that receives a severity and a message.
//! Sinks are only ever used for observability, never for control flow.
//!
//! Built-in sinks:
//! - [`TracingSink`]: forwards to `tracing` with a `channel` field
//! - [`StderrSink`]: plain `Warning:`/`Error:` lines on stderr
//! - [`SilentSink`]: discards everything
//! - [`MemorySink`]: records entries for later inspection

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Default channel name.
pub const DEFAULT_CHANNEL: &str = "wirebuf";

/// Severity of a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "Warning"),
            Severity::Error => write!(f, "Error"),
        }
    }
}

/// Destination for diagnostic entries.
pub trait LogSink: Send + Sync {
    /// Record one entry on the named channel.
    fn log(&self, channel: &str, severity: Severity, message: &str);
}

/// Sink that forwards entries to the `tracing` ecosystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, channel: &str, severity: Severity, message: &str) {
        match severity {
            Severity::Warning => tracing::warn!(channel = channel, "{}", message),
            Severity::Error => tracing::error!(channel = channel, "{}", message),
        }
    }
}

/// Sink that prints entries to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl LogSink for StderrSink {
    fn log(&self, channel: &str, severity: Severity, message: &str) {
        eprintln!("{}: [{}] {}", severity, channel, message);
    }
}

/// Sink that drops every entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl LogSink for SilentSink {
    fn log(&self, _channel: &str, _severity: Severity, _message: &str) {}
}

/// A single entry captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub channel: String,
    pub severity: Severity,
    pub message: String,
}

/// Sink that keeps every entry in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded entries.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Number of entries recorded at the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|r| r.severity == severity)
            .count()
    }

    /// Number of entries recorded.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Check if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Drop all recorded entries.
    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl LogSink for MemorySink {
    fn log(&self, channel: &str, severity: Severity, message: &str) {
        self.records.lock().push(LogRecord {
            channel: channel.to_string(),
            severity,
            message: message.to_string(),
        });
    }
}

/// Named handle onto a sink, passed explicitly into every buffer.
///
/// Cloning is cheap; clones share the same sink.
#[derive(Clone)]
pub struct LogChannel {
    name: Arc<str>,
    sink: Arc<dyn LogSink>,
}

impl LogChannel {
    /// Create a channel over an arbitrary sink.
    pub fn new(name: impl Into<Arc<str>>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            name: name.into(),
            sink,
        }
    }

    /// Channel backed by [`TracingSink`].
    pub fn tracing(name: impl Into<Arc<str>>) -> Self {
        Self::new(name, Arc::new(TracingSink))
    }

    /// Channel backed by [`StderrSink`].
    pub fn stderr(name: impl Into<Arc<str>>) -> Self {
        Self::new(name, Arc::new(StderrSink))
    }

    /// Channel that discards everything.
    pub fn silent() -> Self {
        Self::new(DEFAULT_CHANNEL, Arc::new(SilentSink))
    }

    /// Channel name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn warning(&self, message: &str) {
        self.sink.log(&self.name, Severity::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.sink.log(&self.name, Severity::Error, message);
    }
}

impl Default for LogChannel {
    fn default() -> Self {
        Self::tracing(DEFAULT_CHANNEL)
    }
}

impl fmt::Debug for LogChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogChannel")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
