use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

/// A user-facing notice, kept apart from `tracing` output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: String) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message.into())
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message.into())
    }
}

pub trait Loggable {
    fn add_log(&self, entry: LogEntry);
    fn get_logs(&self) -> Vec<LogEntry>;
}

/// Appends to a bounded log, dropping the oldest entries first.
pub fn push_bounded(logs: &mut Vec<LogEntry>, entry: LogEntry, capacity: usize) {
    if capacity == 0 {
        return;
    }
    logs.push(entry);
    if logs.len() > capacity {
        let overflow = logs.len() - capacity;
        logs.drain(..overflow);
    }
}
