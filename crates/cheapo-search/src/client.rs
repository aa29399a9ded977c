//! HTTP client for the location search backend.
//!
//! Sends the search center (and optionally a radius) to `POST {base}/search`
//! and decodes the attribute-typed response into [`MerchantRecord`]s.
//! Transient failures are retried per [`crate::retry`].

use std::time::Duration;

use async_trait::async_trait;
use cheapo_core::{AppConfig, Coordinates, MerchantRecord};
use cheapo_engine::{BoxError, LocationSearch, SearchQuery, SearchResponse};
use reqwest::{Client, Url};

use crate::decode::decode_locations;
use crate::error::SearchError;
use crate::retry::retry_with_backoff;
use crate::types::{SearchEnvelope, SearchRequest};

const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_BACKOFF_MS: u64 = 500;

/// Client for the location search backend.
///
/// Use [`SearchClient::new`] with the backend's base URL (a wiremock URI in
/// tests) and [`SearchClient::with_retry`] to tune the retry policy.
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: Client,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl SearchClient {
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SearchError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("cheapo/0.1 (deal-search)")
            .build()?;

        // A trailing slash makes `Url::join` append to the path instead of
        // replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| SearchError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_MS,
        })
    }

    /// Builds a client from the search URL, timeout, and retry settings in `config`.
    ///
    /// # Errors
    ///
    /// See [`SearchClient::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, SearchError> {
        Ok(Self::new(&config.search_url, config.http_timeout_secs)?
            .with_retry(config.search_max_retries, config.search_retry_backoff_ms))
    }

    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Searches around `center`. With `radius_meters = None` the backend
    /// picks its default radius, which is echoed back in the response.
    ///
    /// Records that fail to decode are skipped and logged.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Http`] on network failure or a non-2xx status, after
    ///   retries are exhausted for transient failures.
    /// - [`SearchError::Deserialize`] if the envelope is not the expected
    ///   shape or its `searchRadius` is not a non-negative number.
    pub async fn search_locations(
        &self,
        center: Coordinates,
        radius_meters: Option<u32>,
    ) -> Result<SearchResponse, SearchError> {
        let request = SearchRequest {
            latitude: center.latitude,
            longitude: center.longitude,
            search_radius: radius_meters,
        };
        let url = self.search_url()?;

        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.post_json(&url, &request)
        })
        .await?;

        let envelope: SearchEnvelope =
            serde_json::from_value(body).map_err(|e| SearchError::Deserialize {
                context: format!("search(radius={radius_meters:?})"),
                source: e,
            })?;
        let search_radius_meters = envelope.search_radius.as_meters().ok_or_else(|| {
            SearchError::Deserialize {
                context: "searchRadius".to_owned(),
                source: serde::de::Error::custom(format!(
                    "not a radius in meters: {:?}",
                    envelope.search_radius
                )),
            }
        })?;

        let records: Vec<MerchantRecord> = decode_locations(envelope.locations);
        tracing::debug!(
            latitude = center.latitude,
            longitude = center.longitude,
            radius_meters = search_radius_meters,
            count = records.len(),
            "search backend responded"
        );

        Ok(SearchResponse {
            records,
            search_radius_meters,
        })
    }

    fn search_url(&self) -> Result<Url, SearchError> {
        self.base_url
            .join("search")
            .map_err(|e| SearchError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Sends a POST, asserts a 2xx status, and parses the body as JSON.
    async fn post_json(
        &self,
        url: &Url,
        request: &SearchRequest,
    ) -> Result<serde_json::Value, SearchError> {
        let response = self.client.post(url.clone()).json(request).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| SearchError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl LocationSearch for SearchClient {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, BoxError> {
        Ok(self
            .search_locations(query.center, query.radius_meters)
            .await?)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
