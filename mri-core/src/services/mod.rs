//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

pub mod extraction;
pub mod logging;
pub mod paginator;

pub use extraction::{
    resolve_bank_names, ExtractionService, FetchedBanks, FetchedProperties, FetchedUnits,
};
pub use logging::{LogEntry, LogEvent, LogLevel, MemorySink, TracingSink};
pub use paginator::{decode_cursor, Page, Paginator, DEFAULT_MAX_RETRIES};
