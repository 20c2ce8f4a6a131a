//! REST call port
//!
//! The paginator and extraction service only see this trait, so they can be
//! driven by the HTTP client in production and by scripted responses in tests.

use crate::domain::CallResult;

/// One REST request: method name, URL, headers, query params and body
#[derive(Clone, PartialEq, Eq)]
pub struct RestRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RestRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
            params: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new("get", url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers(mut self, headers: &[(String, String)]) -> Self {
        self.headers.extend_from_slice(headers);
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

// Header values are left out so credentials never reach a log line.
impl std::fmt::Debug for RestRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header_names: Vec<&str> = self.headers.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("RestRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &header_names)
            .field("params", &self.params)
            .field("body", &self.body.as_ref().map(|b| b.len()))
            .finish()
    }
}

/// Performs a single REST call and classifies the outcome.
///
/// Implementations never panic on transport problems; every failure is
/// returned as a [`crate::domain::CallError`].
pub trait RestApi: Send + Sync {
    fn call(&self, request: &RestRequest) -> CallResult;
}
