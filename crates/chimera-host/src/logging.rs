//! Bridge from module loggers to the host's `tracing` subscriber

use chimera_core::{LogLevel, LogSink, Logger, LoggerFactory};
use std::fmt;
use std::sync::Arc;
use tracing::Level;

/// Emits module log records as `tracing` events in the host
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, category: &str, message: &dyn fmt::Display) {
        match level {
            LogLevel::Trace => tracing::trace!(category, "{}", message),
            LogLevel::Debug => tracing::debug!(category, "{}", message),
            LogLevel::Info => tracing::info!(category, "{}", message),
            LogLevel::Warn => tracing::warn!(category, "{}", message),
            LogLevel::Error => tracing::error!(category, "{}", message),
        }
    }

    fn enabled(&self, level: LogLevel) -> bool {
        match level {
            LogLevel::Trace => tracing::enabled!(Level::TRACE),
            LogLevel::Debug => tracing::enabled!(Level::DEBUG),
            LogLevel::Info => tracing::enabled!(Level::INFO),
            LogLevel::Warn => tracing::enabled!(Level::WARN),
            LogLevel::Error => tracing::enabled!(Level::ERROR),
        }
    }
}

/// [`LoggerFactory`] registered in the host's base services
#[derive(Clone)]
pub struct TracingLoggerFactory {
    sink: Arc<dyn LogSink>,
}

impl fmt::Debug for TracingLoggerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracingLoggerFactory").finish()
    }
}

impl Default for TracingLoggerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl TracingLoggerFactory {
    /// Create a new logger factory backed by `tracing`
    pub fn new() -> Self {
        Self::with_sink(Arc::new(TracingSink))
    }

    /// Create a logger factory writing to a custom sink
    pub fn with_sink(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }
}

impl LoggerFactory for TracingLoggerFactory {
    fn create_logger(&self, category: &str) -> Logger {
        Logger::new(category, Arc::clone(&self.sink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        records: Mutex<Vec<(LogLevel, String, String)>>,
    }

    impl LogSink for Recorder {
        fn log(&self, level: LogLevel, category: &str, message: &dyn fmt::Display) {
            self.records
                .lock()
                .push((level, category.to_string(), message.to_string()));
        }
    }

    #[test]
    fn test_factory_binds_category() {
        let recorder = Arc::new(Recorder::default());
        let factory = TracingLoggerFactory::with_sink(recorder.clone());

        let logger = factory.create_logger("ExamplePrependModule");
        logger.info("Executing");
        logger.error(format_args!("failed after {} attempts", 3));

        let records = recorder.records.lock();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], (LogLevel::Info, "ExamplePrependModule".to_string(), "Executing".to_string()));
        assert_eq!(records[1].2, "failed after 3 attempts");
    }

    #[test]
    fn test_tracing_sink_without_subscriber() {
        let logger = TracingLoggerFactory::new().create_logger("Test");
        assert_eq!(logger.category(), "Test");
        logger.warn("no subscriber installed");
    }
}
