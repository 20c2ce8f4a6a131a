//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The services
//! depend only on these traits, not on concrete implementations.

mod event_sink;
mod rest_api;

pub use event_sink::EventSink;
pub use rest_api::{RestApi, RestRequest};
