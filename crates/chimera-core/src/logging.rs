//! Host-provided logging for module code
//!
//! A module binary links its own copy of every dependency, so it cannot reach
//! the host's global log subscriber directly. Instead the host registers a
//! [`LoggerFactory`] in the base service collection; loggers created from it
//! forward every record to a [`LogSink`] implemented by the host.

use std::fmt;
use std::sync::Arc;

/// Severity of a log record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Very verbose diagnostics
    Trace,
    /// Diagnostics
    Debug,
    /// Normal operation
    Info,
    /// Recoverable problems
    Warn,
    /// Failures
    Error,
}

/// Destination of log records, implemented by the host
pub trait LogSink: Send + Sync {
    /// Emit one record
    fn log(&self, level: LogLevel, category: &str, message: &dyn fmt::Display);

    /// Check if records at `level` would be emitted
    fn enabled(&self, _level: LogLevel) -> bool {
        true
    }
}

/// Creates loggers bound to a category
pub trait LoggerFactory: Send + Sync {
    /// Create a logger for `category`
    fn create_logger(&self, category: &str) -> Logger;
}

impl dyn LoggerFactory {
    /// Create a logger for the type `T`, categorised by its short name
    pub fn logger_for<T: ?Sized>(&self) -> Logger {
        self.create_logger(short_type_name(std::any::type_name::<T>()))
    }
}

struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _level: LogLevel, _category: &str, _message: &dyn fmt::Display) {}

    fn enabled(&self, _level: LogLevel) -> bool {
        false
    }
}

/// Logger bound to a category
#[derive(Clone)]
pub struct Logger {
    category: Arc<str>,
    sink: Arc<dyn LogSink>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("category", &self.category)
            .finish()
    }
}

impl Logger {
    /// Create a logger writing to `sink`
    pub fn new(category: impl Into<Arc<str>>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            category: category.into(),
            sink,
        }
    }

    /// Create a logger that discards every record
    pub fn disabled(category: impl Into<Arc<str>>) -> Self {
        Self::new(category, Arc::new(NullSink))
    }

    /// Category of this logger
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Check if records at `level` would be emitted
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.sink.enabled(level)
    }

    /// Emit a record at `level`
    pub fn log(&self, level: LogLevel, message: impl fmt::Display) {
        if self.sink.enabled(level) {
            self.sink.log(level, &self.category, &message);
        }
    }

    /// Emit a trace record
    pub fn trace(&self, message: impl fmt::Display) {
        self.log(LogLevel::Trace, message);
    }

    /// Emit a debug record
    pub fn debug(&self, message: impl fmt::Display) {
        self.log(LogLevel::Debug, message);
    }

    /// Emit an info record
    pub fn info(&self, message: impl fmt::Display) {
        self.log(LogLevel::Info, message);
    }

    /// Emit a warning record
    pub fn warn(&self, message: impl fmt::Display) {
        self.log(LogLevel::Warn, message);
    }

    /// Emit an error record
    pub fn error(&self, message: impl fmt::Display) {
        self.log(LogLevel::Error, message);
    }
}

/// Last path segment of a type name, generic arguments removed
///
/// `my_crate::modules::EchoModule<u8>` becomes `EchoModule`.
pub fn short_type_name(type_name: &str) -> &str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit("::").next().unwrap_or(base)
}
