//! Error types for the Airtable client
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//! Remote failures are carried as [`ApiError`] values produced by the
//! classifier in [`crate::classify`].

use crate::classify::{ApiError, ErrorKind};
use thiserror::Error;

/// Boxed cause attached to mapping failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The main error type for the Airtable client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Client-side Errors
    // ============================================================================
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Mapping failed: {message}")]
    Mapping {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("{operation} is not implemented")]
    NotImplemented { operation: &'static str },

    // ============================================================================
    // Remote Errors
    // ============================================================================
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    // ============================================================================
    // Input Errors
    // ============================================================================
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a mapping error without an underlying cause
    pub fn mapping(message: impl Into<String>) -> Self {
        Self::Mapping {
            message: message.into(),
            source: None,
        }
    }

    /// Create a mapping error wrapping its cause
    pub fn mapping_with(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Mapping {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The classified remote error, if this is one
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }

    /// HTTP status code of a remote error
    pub fn status_code(&self) -> Option<u16> {
        self.api().and_then(ApiError::status)
    }

    /// Client-side pre-flight violation
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// Conversion between wire records and typed values failed
    pub fn is_mapping(&self) -> bool {
        matches!(self, Error::Mapping { .. })
    }

    /// The remote resource does not exist (404)
    pub fn is_not_found(&self) -> bool {
        self.api().is_some_and(|e| e.kind() == ErrorKind::NotFound)
    }

    /// Missing or insufficient credentials (401/403)
    pub fn is_auth(&self) -> bool {
        self.api().is_some_and(|e| {
            matches!(
                e.kind(),
                ErrorKind::AuthenticationRequired | ErrorKind::NotAuthorized
            )
        })
    }

    /// The per-base request quota was exceeded (429)
    pub fn is_rate_limited(&self) -> bool {
        self.api()
            .is_some_and(|e| e.kind() == ErrorKind::TooManyRequests)
    }

    /// Any 5xx response
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_some_and(|s| (500..600).contains(&s))
    }

    /// Fallback classification (unknown status or transport failure)
    pub fn is_undefined(&self) -> bool {
        self.api().is_some_and(|e| e.kind() == ErrorKind::Undefined)
    }
}

/// Result type alias for the Airtable client
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("api_key");
        assert_eq!(err.to_string(), "Missing required config field: api_key");

        let err = Error::validation("Property id should be null!");
        assert_eq!(
            err.to_string(),
            "Validation failed: Property id should be null!"
        );

        let err = Error::NotImplemented {
            operation: "replace",
        };
        assert_eq!(err.to_string(), "replace is not implemented");
    }

    #[test]
    fn test_mapping_error_keeps_source() {
        let cause = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::mapping_with("bad record", cause);
        assert!(err.is_mapping());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_taxonomy_helpers() {
        let not_found = Error::from(ApiError::from_status(404, ""));
        assert!(not_found.is_not_found());
        assert_eq!(not_found.status_code(), Some(404));
        assert!(!not_found.is_auth());

        assert!(Error::from(ApiError::from_status(401, "")).is_auth());
        assert!(Error::from(ApiError::from_status(403, "")).is_auth());
        assert!(Error::from(ApiError::from_status(429, "")).is_rate_limited());
        assert!(Error::from(ApiError::from_status(500, "")).is_server_error());
        assert!(Error::from(ApiError::from_status(502, "")).is_server_error());
        assert!(Error::from(ApiError::from_status(502, "")).is_undefined());

        assert!(Error::validation("x").is_validation());
        assert!(Error::config("x").status_code().is_none());
    }
}
