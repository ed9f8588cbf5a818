//! Upstream broadcast API client
//!
//! This module talks to the broadcast-listing API: a GraphQL endpoint that
//! pages through live broadcasts, and REST endpoints exposing per-user
//! profile and stream details.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, error};

use crate::error::{UpstreamError, UpstreamResult};
use crate::models::BroadcastBatch;

const BROADCASTS_QUERY: &str = r#"
query getGenderPreferencePageData($input: BroadcastsInput) {
    broadcasts(input: $input) {
        total
        items {
            id
            username
            country
            sexualOrientation
            profileImageURL
            preview {
                src
                poster
            }
            viewers
            broadcastType
            gender
            tags {
                name
                slug
            }
        }
    }
}
"#;

/// Configuration for the upstream API
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// GraphQL endpoint listing broadcasts
    pub graph_url: String,
    /// Base URL of the REST profile endpoints
    pub rest_url: String,
    /// Gender preference sent with every listing query
    pub gender: String,
    /// Upstream ordering of the listing
    pub order_by: String,
    /// Value of the `apollographql-client-name` header
    pub client_name: String,
    /// Value of the `apollographql-client-version` header
    pub client_version: String,
    /// Timeout applied to each upstream call, in seconds
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            graph_url: "https://pt.cam4.com/graph?operation=getGenderPreferencePageData&ssr=false"
                .to_string(),
            rest_url: "https://pt.cam4.com/rest/v1.0".to_string(),
            gender: "male".to_string(),
            order_by: "trending".to_string(),
            client_name: "CAM4-client".to_string(),
            client_version: "25.5.15-113220utc".to_string(),
            timeout_secs: 30,
        }
    }
}

/// A paginated source of live broadcasts
#[async_trait]
pub trait BroadcastSource: Send + Sync {
    /// Fetch `limit` broadcasts starting at `offset`, plus the reported total
    async fn fetch_batch(&self, offset: u64, limit: u64) -> UpstreamResult<BroadcastBatch>;

    /// Fetch the public profile of a user
    async fn fetch_profile(&self, username: &str) -> UpstreamResult<Value>;

    /// Fetch the live stream details of a user
    async fn fetch_stream_info(&self, username: &str) -> UpstreamResult<Value>;
}

/// GraphQL envelope returned by the listing endpoint
#[derive(Debug, Deserialize)]
struct GraphResponse {
    data: Option<GraphData>,
    errors: Option<Vec<GraphError>>,
}

#[derive(Debug, Deserialize)]
struct GraphData {
    broadcasts: Option<BroadcastBatch>,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: Option<String>,
}

/// Broadcast source backed by the upstream HTTP API
#[derive(Clone)]
pub struct HttpBroadcastSource {
    client: Client,
    config: UpstreamConfig,
}

impl HttpBroadcastSource {
    /// Create a new source with its own HTTP client
    pub fn new(config: UpstreamConfig) -> UpstreamResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(UpstreamError::Request)?;

        Ok(Self { client, config })
    }

    fn listing_body(&self, offset: u64, limit: u64) -> Value {
        json!({
            "operationName": "getGenderPreferencePageData",
            "variables": {
                "input": {
                    "orderBy": self.config.order_by,
                    "filters": [],
                    "gender": self.config.gender,
                    "cursor": { "first": limit, "offset": offset }
                }
            },
            "query": BROADCASTS_QUERY
        })
    }

    fn profile_url(&self, username: &str, resource: &str) -> UpstreamResult<Url> {
        let mut url = Url::parse(&self.config.rest_url)
            .map_err(|e| UpstreamError::InvalidUrl(format!("{}: {}", self.config.rest_url, e)))?;

        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidUrl(self.config.rest_url.clone()))?
            .pop_if_empty()
            .extend(["profile", username, resource]);

        Ok(url)
    }

    async fn get_json(&self, url: Url) -> UpstreamResult<Value> {
        let response = self
            .client
            .get(url.clone())
            .header("accept", "application/json, text/plain, */*")
            .send()
            .await
            .map_err(UpstreamError::from_reqwest)?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        response.json().await.map_err(UpstreamError::from_reqwest)
    }
}

#[async_trait]
impl BroadcastSource for HttpBroadcastSource {
    async fn fetch_batch(&self, offset: u64, limit: u64) -> UpstreamResult<BroadcastBatch> {
        debug!("Fetching broadcasts batch at offset {} (limit {})", offset, limit);

        let response = self
            .client
            .post(&self.config.graph_url)
            .header("apollographql-client-name", &self.config.client_name)
            .header("apollographql-client-version", &self.config.client_version)
            .json(&self.listing_body(offset, limit))
            .send()
            .await
            .map_err(UpstreamError::from_reqwest)?;

        if !response.status().is_success() {
            error!("Broadcast listing returned {}", response.status());
            return Err(UpstreamError::Status {
                status: response.status().as_u16(),
                url: self.config.graph_url.clone(),
            });
        }

        let body: GraphResponse = response.json().await.map_err(UpstreamError::from_reqwest)?;

        match body.data.and_then(|data| data.broadcasts) {
            Some(batch) => Ok(batch),
            None => match body.errors.as_deref().and_then(|errors| errors.first()) {
                Some(first) => Err(UpstreamError::Api {
                    message: first
                        .message
                        .clone()
                        .unwrap_or_else(|| "Unknown API error".to_string()),
                }),
                None => Ok(BroadcastBatch::default()),
            },
        }
    }

    async fn fetch_profile(&self, username: &str) -> UpstreamResult<Value> {
        debug!("Fetching profile for {}", username);
        self.get_json(self.profile_url(username, "info")?).await
    }

    async fn fetch_stream_info(&self, username: &str) -> UpstreamResult<Value> {
        debug!("Fetching stream info for {}", username);
        self.get_json(self.profile_url(username, "streamInfo")?).await
    }
}
