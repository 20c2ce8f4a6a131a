//! Event sink port
//!
//! Components receive their sink at construction and record structured
//! events into it. Where the events end up is up to the implementation.

use crate::services::logging::LogEvent;

pub trait EventSink: Send + Sync {
    /// Record an event. Must not fail or block for long.
    fn record(&self, event: LogEvent);
}
