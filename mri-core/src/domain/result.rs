//! Result and error types for the core library

use thiserror::Error;

use super::call::CallError;

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to fetch {endpoint} after {attempts} attempt(s): {source}")]
    Pagination {
        endpoint: String,
        attempts: u32,
        #[source]
        source: CallError,
    },

    #[error("Unexpected payload from {endpoint}: {message}")]
    UnexpectedPayload { endpoint: String, message: String },

    #[error("Bank {bank_id} referenced by property {property_id} is not in the bank map")]
    BankLookup {
        bank_id: String,
        property_id: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an unexpected payload error for an endpoint
    pub fn unexpected_payload(endpoint: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::UnexpectedPayload {
            endpoint: endpoint.into(),
            message: msg.into(),
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
