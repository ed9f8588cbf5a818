//! Service configuration loaded from defaults and environment variables

use anyhow::Result;
use common::UpstreamConfig;
use ::config::{Config, Environment};
use serde::Deserialize;

/// Prefix of every environment variable read by the service
pub const ENV_PREFIX: &str = "BROADCASTS";

/// Broadcasts service settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    pub graph_url: String,
    pub rest_url: String,
    pub gender: String,
    pub order_by: String,
    pub client_name: String,
    pub client_version: String,
    /// Broadcasts requested per upstream call
    pub batch_size: u64,
    /// Upper bound on upstream calls made for one request
    pub max_batches: u64,
    /// Timeout of a single upstream call, in seconds
    pub timeout_secs: u64,
}

impl Settings {
    /// Load settings from environment variables
    ///
    /// # Environment Variables
    /// - `BROADCASTS_BIND_ADDR`: listen address (default: "0.0.0.0:3001")
    /// - `BROADCASTS_GRAPH_URL`, `BROADCASTS_REST_URL`: upstream endpoints
    /// - `BROADCASTS_GENDER`, `BROADCASTS_ORDER_BY`: listing query (default: "male", "trending")
    /// - `BROADCASTS_CLIENT_NAME`, `BROADCASTS_CLIENT_VERSION`: GraphQL client headers
    /// - `BROADCASTS_BATCH_SIZE`: broadcasts per upstream call (default: 300)
    /// - `BROADCASTS_MAX_BATCHES`: upstream calls allowed per request (default: 100)
    /// - `BROADCASTS_TIMEOUT_SECS`: upstream call timeout (default: 30)
    pub fn from_env() -> Result<Self> {
        let upstream = UpstreamConfig::default();

        let settings = Config::builder()
            .set_default("bind_addr", "0.0.0.0:3001")?
            .set_default("graph_url", upstream.graph_url)?
            .set_default("rest_url", upstream.rest_url)?
            .set_default("gender", upstream.gender)?
            .set_default("order_by", upstream.order_by)?
            .set_default("client_name", upstream.client_name)?
            .set_default("client_version", upstream.client_version)?
            .set_default("batch_size", 300_i64)?
            .set_default("max_batches", 100_i64)?
            .set_default("timeout_secs", upstream.timeout_secs as i64)?
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Upstream client configuration derived from these settings
    pub fn upstream(&self) -> UpstreamConfig {
        UpstreamConfig {
            graph_url: self.graph_url.clone(),
            rest_url: self.rest_url.clone(),
            gender: self.gender.clone(),
            order_by: self.order_by.clone(),
            client_name: self.client_name.clone(),
            client_version: self.client_version.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}
