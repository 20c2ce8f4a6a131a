//! Paginator - walks a `nextLink` page sequence and flattens the items
//!
//! The first request carries the caller's params. Every following request
//! goes to the cursor URL returned by the server, which already encodes the
//! paging parameters. A failed page is retried as-is a bounded number of
//! times; the cursor only advances on success.

use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::domain::result::{Error, Result};
use crate::ports::{EventSink, RestApi, RestRequest};
use crate::services::logging::LogEvent;

/// Retries of a failing page when nothing is configured
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// One page of a paginated response
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub value: Vec<JsonValue>,
    pub next_link: Option<String>,
}

impl Page {
    /// Read `value` and `nextLink` from a success payload
    pub fn from_payload(endpoint: &str, payload: JsonValue) -> Result<Self> {
        let JsonValue::Object(mut obj) = payload else {
            return Err(Error::unexpected_payload(
                endpoint,
                "expected a JSON object with `value` and `nextLink`",
            ));
        };

        let value = match obj.remove("value") {
            Some(JsonValue::Array(items)) => items,
            _ => Vec::new(),
        };

        let next_link = match obj.remove("nextLink") {
            Some(JsonValue::String(link)) if !link.is_empty() => Some(link),
            _ => None,
        };

        Ok(Self { value, next_link })
    }
}

/// Restore the `$` characters MRI percent-encodes in `nextLink`
pub fn decode_cursor(next_link: &str) -> String {
    next_link.replace("%24", "$")
}

pub struct Paginator {
    api: Arc<dyn RestApi>,
    events: Arc<dyn EventSink>,
    max_retries: u32,
}

impl Paginator {
    pub fn new(api: Arc<dyn RestApi>, events: Arc<dyn EventSink>, max_retries: u32) -> Self {
        Self {
            api,
            events,
            max_retries,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Fetch every page starting at `initial` and return all items in order
    pub fn fetch_all(&self, endpoint: &str, initial: RestRequest) -> Result<Vec<JsonValue>> {
        let mut items = Vec::new();
        let mut request = initial;
        let mut pages = 0usize;

        loop {
            let payload = self.fetch_page(endpoint, &request)?;
            let page = Page::from_payload(endpoint, payload)?;
            pages += 1;

            self.events.record(
                LogEvent::debug("page_fetched")
                    .with_endpoint(endpoint)
                    .with_url(&request.url)
                    .with_count(page.value.len()),
            );

            items.extend(page.value);

            match page.next_link {
                Some(link) => request = next_request(&request, &link),
                None => break,
            }
        }

        self.events.record(
            LogEvent::new("pagination_completed")
                .with_endpoint(endpoint)
                .with_count(items.len())
                .with_error_details(format!("pages={}", pages)),
        );

        Ok(items)
    }

    /// Send one page request, retrying failures up to `max_retries` times
    fn fetch_page(&self, endpoint: &str, request: &RestRequest) -> Result<JsonValue> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let err = match self.api.call(request) {
                Ok(payload) => return Ok(payload),
                Err(err) => err,
            };

            let mut event = LogEvent::warn("page_failed")
                .with_endpoint(endpoint)
                .with_url(&request.url)
                .with_attempt(attempt)
                .with_error(err.to_string())
                .with_error_details(err.kind().as_str());
            if let Some(status) = err.status() {
                event = event.with_status(status);
            }
            self.events.record(event);

            if !err.is_retryable() || attempt > self.max_retries {
                self.events.record(
                    LogEvent::error("pagination_aborted")
                        .with_endpoint(endpoint)
                        .with_attempt(attempt)
                        .with_error(err.to_string()),
                );
                return Err(Error::Pagination {
                    endpoint: endpoint.to_string(),
                    attempts: attempt,
                    source: err,
                });
            }
        }
    }
}

/// Request for the page behind `next_link`: same method, headers and body, no params
fn next_request(previous: &RestRequest, next_link: &str) -> RestRequest {
    RestRequest {
        method: previous.method.clone(),
        url: decode_cursor(next_link),
        headers: previous.headers.clone(),
        params: Vec::new(),
        body: previous.body.clone(),
    }
}
