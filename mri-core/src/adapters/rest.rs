//! MRI REST client
//!
//! Sends one blocking request per call and classifies the response with
//! [`classify_response`]. Transport failures are converted to
//! [`CallError::Transport`] at this boundary.

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;

use crate::domain::call::classify_response;
use crate::domain::result::{Error, Result};
use crate::domain::{CallError, CallResult};
use crate::ports::{EventSink, RestApi, RestRequest};
use crate::services::logging::LogEvent;

/// Blocking HTTP client implementing [`RestApi`]
pub struct RestClient {
    client: Client,
    timeout: Option<Duration>,
    events: Arc<dyn EventSink>,
}

impl RestClient {
    /// Create a client using the transport's default timeout
    pub fn new(events: Arc<dyn EventSink>) -> Result<Self> {
        Self::with_timeout(None, events)
    }

    pub fn with_timeout(timeout: Option<Duration>, events: Arc<dyn EventSink>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout,
            events,
        })
    }

    /// Map request errors to messages that keep the underlying cause
    fn map_request_error(&self, error: reqwest::Error) -> CallError {
        if error.is_timeout() {
            let after = self
                .timeout
                .map(|t| format!(" after {} seconds", t.as_secs()))
                .unwrap_or_default();
            CallError::Transport(format!("Connection timed out{}: {}", after, error))
        } else if error.is_connect() {
            CallError::Transport(format!("Unable to connect to MRI servers: {}", error))
        } else {
            CallError::Transport(format!("MRI request failed: {}", error))
        }
    }
}

/// Resolve a verb name to a method, case-insensitively
pub fn parse_method(name: &str) -> std::result::Result<Method, CallError> {
    match name.to_ascii_lowercase().as_str() {
        "get" => Ok(Method::GET),
        "post" => Ok(Method::POST),
        "put" => Ok(Method::PUT),
        "patch" => Ok(Method::PATCH),
        "delete" => Ok(Method::DELETE),
        "head" => Ok(Method::HEAD),
        "options" => Ok(Method::OPTIONS),
        _ => Err(CallError::UnsupportedMethod(name.to_string())),
    }
}

impl RestApi for RestClient {
    fn call(&self, request: &RestRequest) -> CallResult {
        let method = parse_method(&request.method)?;

        let mut builder = self.client.request(method.clone(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        self.events.record(
            LogEvent::debug("request_sent")
                .with_url(&request.url)
                .with_error_details(format!("method={}", method)),
        );

        let response = builder.send().map_err(|e| self.map_request_error(e))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response.text().map_err(|e| self.map_request_error(e))?;

        self.events.record(
            LogEvent::debug("response_received")
                .with_url(&request.url)
                .with_status(status),
        );

        classify_response(status, &content_type, &body)
    }
}
