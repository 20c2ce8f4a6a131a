//! Logging - structured events recorded through an injected sink
//!
//! Services never reach for a global logger. They record [`LogEvent`]s into
//! the [`EventSink`] they were built with: [`TracingSink`] forwards to the
//! `tracing` subscriber installed by the binary, [`MemorySink`] keeps entries
//! in memory for inspection.
//!
//! Credentials are never part of an event.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ports::EventSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// A log event to be recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    pub level: LogLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl LogEvent {
    /// Create a new info-level event with just an event name
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            level: LogLevel::Info,
            endpoint: None,
            url: None,
            attempt: None,
            status: None,
            count: None,
            error_message: None,
            error_details: None,
        }
    }

    pub fn debug(event: impl Into<String>) -> Self {
        Self::new(event).with_level(LogLevel::Debug)
    }

    pub fn warn(event: impl Into<String>) -> Self {
        Self::new(event).with_level(LogLevel::Warn)
    }

    pub fn error(event: impl Into<String>) -> Self {
        Self::new(event).with_level(LogLevel::Error)
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the MRI endpoint (`$api` name) the event relates to
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = Some(attempt);
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Set a record count (page size, accumulated total, ...)
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Set error information
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Set error details (error kind, identifiers involved)
    pub fn with_error_details(mut self, details: impl Into<String>) -> Self {
        self.error_details = Some(details.into());
        self
    }
}

macro_rules! emit {
    ($level:ident, $event:expr) => {
        tracing::$level!(
            endpoint = $event.endpoint.as_deref(),
            url = $event.url.as_deref(),
            attempt = $event.attempt,
            status = $event.status,
            count = $event.count,
            error = $event.error_message.as_deref(),
            details = $event.error_details.as_deref(),
            "{}",
            $event.event
        )
    };
}

/// Forwards events to the `tracing` subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: LogEvent) {
        match event.level {
            LogLevel::Debug => emit!(debug, event),
            LogLevel::Info => emit!(info, event),
            LogLevel::Warn => emit!(warn, event),
            LogLevel::Error => emit!(error, event),
        }
    }
}

/// A recorded event with the time it was recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: LogEvent,
}

/// Keeps every recorded event in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in recording order
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map(|e| e.to_vec()).unwrap_or_default()
    }

    /// Entries at warn level or above
    pub fn errors(&self) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.event.level >= LogLevel::Warn)
            .collect()
    }

    /// Entries with the given event name
    pub fn named(&self, event: &str) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.event.event == event)
            .collect()
    }

    pub fn count(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: LogEvent) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(LogEntry {
                timestamp: Utc::now(),
                event,
            });
        }
    }
}
