//! Client configuration
//!
//! Holds the API key, endpoint URL, optional timeout and the client-side
//! rate limit. The API key and base id can be resolved from the process
//! environment (`AIRTABLE_API_KEY`, `AIRTABLE_BASE`, `AIRTABLE_ENDPOINT_URL`).

use crate::error::{Error, Result};
use crate::http::RateLimiterConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;
use url::Url;

// ============================================================================
// Defaults
// ============================================================================

/// Public Airtable endpoint
pub const ENDPOINT_URL: &str = "https://api.airtable.com/v0";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "AIRTABLE_API_KEY";

/// Environment variable holding the base id
pub const BASE_ENV: &str = "AIRTABLE_BASE";

/// Environment variable overriding the endpoint URL
pub const ENDPOINT_ENV: &str = "AIRTABLE_ENDPOINT_URL";

fn default_endpoint_url() -> String {
    ENDPOINT_URL.to_string()
}

fn default_rate_limit() -> Option<RateLimiterConfig> {
    Some(RateLimiterConfig::default())
}

// ============================================================================
// Configuration
// ============================================================================

/// Connection settings for an [`Airtable`](crate::client::Airtable) client
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Personal access token or API key
    pub api_key: String,

    /// Base URL of the REST API
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,

    /// Connect/read/write timeout in milliseconds
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Client-side rate limit, `None` disables it
    #[serde(default = "default_rate_limit")]
    pub rate_limit: Option<RateLimiterConfig>,
}

impl Configuration {
    /// Configuration for the public endpoint with the given key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint_url: default_endpoint_url(),
            timeout_ms: None,
            rate_limit: default_rate_limit(),
        }
    }

    /// Create a new config builder
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    /// Resolve the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        info!("Using environment variable '{API_KEY_ENV}' to get api key");
        let api_key = lookup(API_KEY_ENV)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::missing_field(API_KEY_ENV))?;

        let mut config = Self::new(api_key);
        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|v| !v.trim().is_empty()) {
            info!("Using environment variable '{ENDPOINT_ENV}' as endpoint: {endpoint}");
            config.endpoint_url = endpoint;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check required values
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::config("Missing Airtable API-Key"));
        }
        if self.endpoint_url.trim().is_empty() {
            return Err(Error::config("Missing endpointUrl"));
        }
        Url::parse(&self.endpoint_url)?;
        Ok(())
    }

    /// Configured timeout
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl std::fmt::Debug for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configuration")
            .field("api_key", &"***")
            .field("endpoint_url", &self.endpoint_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}

/// Resolve the base id from `AIRTABLE_BASE`
pub fn base_id_from_env() -> Result<String> {
    base_id_from_lookup(|key| std::env::var(key).ok())
}

/// Resolve the base id through an arbitrary variable lookup
pub fn base_id_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
    info!("Using environment variable '{BASE_ENV}' to get base id");
    lookup(BASE_ENV)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::missing_field(BASE_ENV))
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`Configuration`]
#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    api_key: Option<String>,
    endpoint_url: Option<String>,
    timeout_ms: Option<u64>,
    rate_limit: Option<Option<RateLimiterConfig>>,
}

impl ConfigurationBuilder {
    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the endpoint URL
    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    /// Set the timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Set the rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.rate_limit = Some(Some(config));
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.rate_limit = Some(None);
        self
    }

    /// Build and validate the config
    pub fn build(self) -> Result<Configuration> {
        let config = Configuration {
            api_key: self.api_key.ok_or_else(|| Error::missing_field("api_key"))?,
            endpoint_url: self.endpoint_url.unwrap_or_else(default_endpoint_url),
            timeout_ms: self.timeout_ms,
            rate_limit: self.rate_limit.unwrap_or_else(default_rate_limit),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_new_uses_public_endpoint() {
        let config = Configuration::new("key");
        assert_eq!(config.endpoint_url, ENDPOINT_URL);
        assert!(config.timeout().is_none());
        assert!(config.rate_limit.is_some());
    }

    #[test]
    fn test_builder() {
        let config = Configuration::builder()
            .api_key("key")
            .endpoint_url("http://localhost:8080/v0")
            .timeout(Duration::from_millis(1500))
            .no_rate_limit()
            .build()
            .unwrap();

        assert_eq!(config.api_key, "key");
        assert_eq!(config.endpoint_url, "http://localhost:8080/v0");
        assert_eq!(config.timeout(), Some(Duration::from_millis(1500)));
        assert!(config.rate_limit.is_none());
    }

    #[test]
    fn test_builder_requires_api_key() {
        let err = Configuration::builder().build().unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { .. }));
    }

    #[test]
    fn test_validate_rejects_blank_values() {
        let err = Configuration::new("  ").validate().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: Missing Airtable API-Key");

        let mut config = Configuration::new("key");
        config.endpoint_url = String::new();
        assert_eq!(
            config.validate().unwrap_err().to_string(),
            "Configuration error: Missing endpointUrl"
        );

        config.endpoint_url = "not a url".to_string();
        assert!(matches!(
            config.validate().unwrap_err(),
            Error::InvalidUrl(_)
        ));
    }

    #[test]
    fn test_from_lookup() {
        let config = Configuration::from_lookup(lookup(&[
            (API_KEY_ENV, "env-key"),
            (ENDPOINT_ENV, "http://127.0.0.1:9000/v0"),
        ]))
        .unwrap();
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.endpoint_url, "http://127.0.0.1:9000/v0");

        let err = Configuration::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required config field: AIRTABLE_API_KEY"
        );
    }

    #[test]
    fn test_base_id_from_lookup() {
        assert_eq!(
            base_id_from_lookup(lookup(&[(BASE_ENV, "appXYZ")])).unwrap(),
            "appXYZ"
        );
        assert!(base_id_from_lookup(lookup(&[(BASE_ENV, "")])).is_err());
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: Configuration = serde_json::from_str(r#"{"api_key": "k"}"#).unwrap();
        assert_eq!(config.endpoint_url, ENDPOINT_URL);
        assert_eq!(config.rate_limit, Some(RateLimiterConfig::default()));
    }

    #[test]
    fn test_debug_masks_key() {
        let rendered = format!("{:?}", Configuration::new("secret-key"));
        assert!(!rendered.contains("secret-key"));
    }
}
