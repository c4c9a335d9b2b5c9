//! Structured logging to stderr
//!
//! Every line is a JSON [`LogEntry`]. Entries below the configured threshold
//! are dropped before serialization.

use crate::types::{LogEntry, LogLevel};
use serde_json::Value;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, Default)]
pub struct Logger {
    threshold: LogLevel,
}

impl Logger {
    pub fn new(threshold: LogLevel) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> LogLevel {
        self.threshold
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level.should_log(self.threshold)
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        if self.enabled(level) {
            self.write(&LogEntry::new(level, message));
        }
    }

    pub fn log_with_context(&self, level: LogLevel, message: &str, context: Value) {
        if self.enabled(level) {
            self.write(&LogEntry::new(level, message).with_context(context));
        }
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    fn write(&self, entry: &LogEntry) {
        // Unwritable lines are dropped.
        let _ = write_entry(&mut io::stderr().lock(), entry);
    }
}

/// Write one entry as a JSON line
pub fn write_entry<W: Write>(writer: &mut W, entry: &LogEntry) -> io::Result<()> {
    let line = entry
        .to_json_string()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}
