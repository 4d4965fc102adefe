//! Configured root client

use super::base::Base;
use crate::config::{base_id_from_env, Configuration};
use crate::error::{Error, Result};
use crate::http::{HttpTransport, Transport};
use crate::mapping::{ConverterRegistry, FieldMapper};
use std::sync::Arc;
use tracing::info;

/// Entry point: owns the configuration, the transport and the mapper
#[derive(Clone)]
pub struct Airtable {
    config: Configuration,
    transport: Arc<dyn Transport>,
    mapper: Arc<FieldMapper>,
}

impl Airtable {
    /// Client over HTTP for a validated configuration
    pub fn new(config: Configuration) -> Result<Self> {
        config.validate()?;
        if let Some(timeout) = config.timeout() {
            info!("Set connection timeout to {}ms", timeout.as_millis());
        }
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Client over any transport
    pub fn with_transport(config: Configuration, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            mapper: Arc::new(FieldMapper::default()),
        }
    }

    /// Client configured from `AIRTABLE_API_KEY` and `AIRTABLE_ENDPOINT_URL`
    pub fn from_env() -> Result<Self> {
        Self::new(Configuration::from_env()?)
    }

    /// Replace the converters used by bases created afterwards
    #[must_use]
    pub fn with_converters(mut self, converters: ConverterRegistry) -> Self {
        self.mapper = Arc::new(FieldMapper::new(converters));
        self
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn endpoint_url(&self) -> &str {
        &self.config.endpoint_url
    }

    pub fn mapper(&self) -> &FieldMapper {
        &self.mapper
    }

    /// Base with the given id
    pub fn base(&self, base_id: &str) -> Result<Base> {
        if base_id.trim().is_empty() {
            return Err(Error::config("base was null"));
        }
        Ok(Base::new(
            base_id,
            &self.config.endpoint_url,
            Arc::clone(&self.transport),
            Arc::clone(&self.mapper),
        ))
    }

    /// Base whose id comes from `AIRTABLE_BASE`
    pub fn base_from_env(&self) -> Result<Base> {
        self.base(&base_id_from_env()?)
    }
}

impl std::fmt::Debug for Airtable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Airtable")
            .field("config", &self.config)
            .field("mapper", &self.mapper)
            .finish_non_exhaustive()
    }
}
