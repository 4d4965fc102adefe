//! Error classification for Airtable responses
//!
//! Maps HTTP status codes and the Airtable error envelope
//! (`{"error": {"type": "...", "message": "..."}}`) onto a closed set of
//! [`ErrorKind`]s, each with a default human-readable message.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::error;

/// Hint attached to connection timeouts
pub const TIMEOUT_HINT: &str = "possible forgotten to set correct apiKey or base?";

/// Fallback message for a 404 without a body message
pub const NOT_FOUND_MESSAGE: &str = "Could not find what you are looking for";

/// Closed set of remote error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 401
    AuthenticationRequired,
    /// 403
    NotAuthorized,
    /// 404
    NotFound,
    /// 413
    RequestTooLarge,
    /// 422, details come from the error envelope
    InvalidRequest,
    /// 429
    TooManyRequests,
    /// 500
    ServerError,
    /// 503
    ServiceUnavailable,
    /// Anything else, including transport failures
    Undefined,
}

impl ErrorKind {
    /// Classify a status code
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorKind::AuthenticationRequired,
            403 => ErrorKind::NotAuthorized,
            404 => ErrorKind::NotFound,
            413 => ErrorKind::RequestTooLarge,
            422 => ErrorKind::InvalidRequest,
            429 => ErrorKind::TooManyRequests,
            500 => ErrorKind::ServerError,
            503 => ErrorKind::ServiceUnavailable,
            _ => ErrorKind::Undefined,
        }
    }

    /// Upper-case code shown in messages
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            ErrorKind::NotAuthorized => "NOT_AUTHORIZED",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::RequestTooLarge => "REQUEST_TOO_LARGE",
            ErrorKind::InvalidRequest => "INVALID_REQUEST",
            ErrorKind::TooManyRequests => "TOO_MANY_REQUESTS",
            ErrorKind::ServerError => "SERVER_ERROR",
            ErrorKind::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorKind::Undefined => "UNDEFINED_ERROR",
        }
    }

    /// Default message for the kind
    pub fn default_message(self) -> &'static str {
        match self {
            ErrorKind::AuthenticationRequired => {
                "You should provide valid api key to perform this operation"
            }
            ErrorKind::NotAuthorized => "You are not authorized to perform this operation",
            ErrorKind::NotFound => NOT_FOUND_MESSAGE,
            ErrorKind::RequestTooLarge => "Request body is too large",
            ErrorKind::InvalidRequest => "The request could not be processed",
            ErrorKind::TooManyRequests => {
                "You have made too many requests in a short period of time. Please retry your request later"
            }
            ErrorKind::ServerError => "Try again. If the problem persists, contact support.",
            ErrorKind::ServiceUnavailable => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            ErrorKind::Undefined => "Undefined error",
        }
    }
}

/// A classified remote failure
///
/// Renders as `"{message} ({code}) [Http code {status}]"`; the status suffix
/// is left out for failures that never produced a response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} ({code}){}", .status.map(|s| format!(" [Http code {s}]")).unwrap_or_default())]
pub struct ApiError {
    kind: ErrorKind,
    code: String,
    message: String,
    status: Option<u16>,
    hint: Option<&'static str>,
}

impl ApiError {
    /// Classify a non-success response from its status and raw body
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = ErrorKind::from_status(status);
        let envelope = ErrorEnvelope::parse(body);

        let (code, message) = match kind {
            ErrorKind::NotFound => (
                kind.code().to_string(),
                envelope
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| kind.default_message().to_string()),
            ),
            ErrorKind::InvalidRequest => match envelope {
                Some(e) => (
                    e.error_type.unwrap_or_else(|| kind.code().to_string()),
                    e.message.unwrap_or_else(|| kind.default_message().to_string()),
                ),
                None => (kind.code().to_string(), fallback_message(kind, body)),
            },
            ErrorKind::Undefined => (kind.code().to_string(), fallback_message(kind, body)),
            _ => (kind.code().to_string(), kind.default_message().to_string()),
        };

        Self {
            kind,
            code,
            message,
            status: Some(status),
            hint: None,
        }
    }

    /// Wrap a failure that happened before any response arrived
    pub fn transport(message: impl Into<String>, timed_out: bool) -> Self {
        let hint = if timed_out {
            error!("{TIMEOUT_HINT}");
            Some(TIMEOUT_HINT)
        } else {
            None
        };

        Self {
            kind: ErrorKind::Undefined,
            code: ErrorKind::Undefined.code().to_string(),
            message: message.into(),
            status: None,
            hint,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Either the kind's code or the `type` from a 422 envelope
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Diagnostic hint, set for connection timeouts
    pub fn hint(&self) -> Option<&'static str> {
        self.hint
    }
}

fn fallback_message(kind: ErrorKind, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        kind.default_message().to_string()
    } else {
        body.to_string()
    }
}

/// Airtable error body
///
/// The service sends either `{"error": {"type", "message"}}` or the short
/// form `{"error": "NOT_FOUND"}`.
#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(rename = "type")]
    error_type: Option<String>,
    message: Option<String>,
}

impl ErrorEnvelope {
    fn parse(body: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(body).ok()?;
        match value.get("error")? {
            error @ Value::Object(_) => serde_json::from_value(error.clone()).ok(),
            Value::String(code) => Some(Self {
                error_type: Some(code.clone()),
                message: None,
            }),
            _ => None,
        }
    }
}
