//! MRI Core - extraction of banks, properties and units from the MRI API
//!
//! This crate follows hexagonal architecture:
//!
//! - **domain**: Records, credentials and call outcomes
//! - **ports**: Trait definitions for external dependencies (RestApi, EventSink)
//! - **services**: Pagination and the extraction passes
//! - **adapters**: Concrete implementations (reqwest client, mock server for tests)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::sync::Arc;

use adapters::rest::RestClient;
use config::Config;
use ports::EventSink;
use services::ExtractionService;

// Re-export commonly used types at crate root
pub use domain::result::{Error, Result};
pub use domain::{
    AuthIdentity, BankMap, CallError, CallErrorKind, Extraction, PropertyDetail, UnitRecord,
};

/// Main context for MRI operations
///
/// Holds the validated configuration, the HTTP client and the services
/// built on top of it.
pub struct MriContext {
    pub config: Config,
    pub events: Arc<dyn EventSink>,
    pub client: Arc<RestClient>,
    pub extraction_service: ExtractionService,
}

impl MriContext {
    /// Validate `config` and wire the services
    pub fn new(config: Config, events: Arc<dyn EventSink>) -> Result<Self> {
        config.validate()?;

        let client = Arc::new(RestClient::with_timeout(config.timeout(), Arc::clone(&events))?);
        let extraction_service =
            ExtractionService::new(&config, client.clone(), Arc::clone(&events));

        Ok(Self {
            config,
            events,
            client,
            extraction_service,
        })
    }
}
