//! Outcome of a single REST call
//!
//! Every request made against the MRI API ends up as a [`CallResult`]:
//! either the parsed JSON payload or a [`CallError`] naming what went wrong.
//! Classification of a raw HTTP response lives here as a pure function so it
//! can be exercised without a network.

use serde_json::Value as JsonValue;
use thiserror::Error;

/// Lower bound (inclusive) of the status band treated as success
pub const SUCCESS_STATUS_MIN: u16 = 200;

/// Upper bound (exclusive) of the status band treated as success.
/// 205 and above are errors even though some are valid 2xx codes.
pub const SUCCESS_STATUS_MAX: u16 = 205;

/// Result of one REST call
pub type CallResult = std::result::Result<JsonValue, CallError>;

/// Failure kinds of a REST call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallErrorKind {
    Dispatch,
    Transport,
    ContentType,
    Parse,
    Server,
}

impl CallErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallErrorKind::Dispatch => "dispatch",
            CallErrorKind::Transport => "transport",
            CallErrorKind::ContentType => "content_type",
            CallErrorKind::Parse => "parse",
            CallErrorKind::Server => "server",
        }
    }
}

/// Error detail reported by the server for a non-success status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerErrorDetail {
    /// `{"error": {"code": ..., "message": ...}}` with both fields present
    Structured { code: String, message: String },
    /// Raw response text, braces escaped
    Raw(String),
}

impl std::fmt::Display for ServerErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // The rendered pair keeps the upstream naming: "message" holds the
            // error code and "detail" holds the error message.
            ServerErrorDetail::Structured { code, message } => write!(
                f,
                "{{\"message\": {}, \"detail\": {}}}",
                JsonValue::String(code.clone()),
                JsonValue::String(message.clone())
            ),
            ServerErrorDetail::Raw(text) => f.write_str(text),
        }
    }
}

/// Typed failure of a REST call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("{0}")]
    Transport(String),

    #[error("Can't process response from server. Status Code: {status} Data from server: {body}")]
    NotJson { status: u16, body: String },

    #[error("Unable to parse response as JSON")]
    InvalidJson,

    #[error("Error from server, Status Code: {status} data returned: {detail}")]
    Server {
        status: u16,
        detail: ServerErrorDetail,
    },
}

impl CallError {
    pub fn kind(&self) -> CallErrorKind {
        match self {
            CallError::UnsupportedMethod(_) => CallErrorKind::Dispatch,
            CallError::Transport(_) => CallErrorKind::Transport,
            CallError::NotJson { .. } => CallErrorKind::ContentType,
            CallError::InvalidJson => CallErrorKind::Parse,
            CallError::Server { .. } => CallErrorKind::Server,
        }
    }

    /// HTTP status of the response, when one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            CallError::NotJson { status, .. } | CallError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether sending the same request again could succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, CallError::UnsupportedMethod(_))
    }
}

/// Whether a status code lies in the success band [200, 205)
pub fn is_success_status(status: u16) -> bool {
    (SUCCESS_STATUS_MIN..SUCCESS_STATUS_MAX).contains(&status)
}

/// Escape braces so the text can be embedded in a format template
pub fn escape_braces(text: &str) -> String {
    text.replace('{', "{{").replace('}', "}}")
}

/// Classify a received HTTP response
pub fn classify_response(status: u16, content_type: &str, body: &str) -> CallResult {
    if !content_type.to_ascii_lowercase().contains("json") {
        return Err(CallError::NotJson {
            status,
            body: escape_braces(body),
        });
    }

    let parsed: JsonValue = serde_json::from_str(body).map_err(|_| CallError::InvalidJson)?;

    if is_success_status(status) {
        return Ok(parsed);
    }

    Err(CallError::Server {
        status,
        detail: server_error_detail(&parsed, body),
    })
}

fn server_error_detail(parsed: &JsonValue, body: &str) -> ServerErrorDetail {
    parsed
        .as_object()
        .and_then(|obj| obj.get("error"))
        .and_then(|error| {
            let code = truthy_text(error.get("code")?)?;
            let message = truthy_text(error.get("message")?)?;
            Some(ServerErrorDetail::Structured { code, message })
        })
        .unwrap_or_else(|| ServerErrorDetail::Raw(escape_braces(body)))
}

/// Text form of a non-empty string or non-zero number
fn truthy_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}
