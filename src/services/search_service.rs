use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config::SearchSettings;
use crate::models::SearchResult;

pub const DEFAULT_RESULT_COUNT: i64 = 5;
pub const MAX_PROVIDER_RESULTS: i64 = 10;

#[derive(Debug, Error)]
pub enum SearchProviderError {
    #[error("search request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("search provider returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(
        &self,
        query: &str,
        num_results: u32,
    ) -> Result<Vec<SearchResult>, SearchProviderError>;
}

#[derive(Clone)]
pub struct SearchService {
    settings: SearchSettings,
    provider: Arc<dyn SearchProvider>,
}

impl SearchService {
    pub fn new(settings: SearchSettings) -> Result<Self> {
        let provider = Arc::new(SerperProvider::new(&settings)?);
        Ok(Self { settings, provider })
    }

    #[cfg(test)]
    pub fn with_provider(settings: SearchSettings, provider: Arc<dyn SearchProvider>) -> Self {
        Self { settings, provider }
    }

    /// Provider failures degrade to an empty result list so that callers
    /// always get a well-formed response.
    pub async fn search(&self, query: &str, num_results: i64) -> Result<Vec<SearchResult>> {
        if self.settings.api_key.trim().is_empty() {
            return Ok(Vec::new());
        }

        match self
            .provider
            .search(query, requested_count(num_results))
            .await
        {
            Ok(results) => Ok(results),
            Err(e) => {
                warn!("Search provider error: {}", e);
                Ok(Vec::new())
            }
        }
    }
}

// Non-positive counts fall back to the default; the upper bound is the
// provider's documented maximum per request.
fn requested_count(requested: i64) -> u32 {
    if requested <= 0 {
        DEFAULT_RESULT_COUNT as u32
    } else {
        requested.min(MAX_PROVIDER_RESULTS) as u32
    }
}

pub struct SerperProvider {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

impl SerperProvider {
    pub fn new(settings: &SearchSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            api_key: settings.api_key.clone(),
            endpoint: settings.endpoint.clone(),
            client,
        })
    }
}

#[async_trait]
impl SearchProvider for SerperProvider {
    async fn search(
        &self,
        query: &str,
        num_results: u32,
    ) -> Result<Vec<SearchResult>, SearchProviderError> {
        let body = SerperSearchRequest {
            q: query.to_string(),
            num: num_results,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SearchProviderError::Status { status, body });
        }

        let data: SerperSearchResponse = response.json().await?;

        Ok(data.organic.into_iter().map(SearchResult::from).collect())
    }
}

#[derive(Debug, Serialize)]
struct SerperSearchRequest {
    q: String,
    num: u32,
}

#[derive(Debug, Deserialize)]
struct SerperSearchResponse {
    #[serde(default)]
    organic: Vec<SerperOrganicResult>,
}

#[derive(Debug, Deserialize)]
struct SerperOrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    link: String,
    #[serde(default, rename = "displayLink")]
    display_link: String,
}

impl From<SerperOrganicResult> for SearchResult {
    fn from(item: SerperOrganicResult) -> Self {
        Self {
            title: item.title,
            snippet: item.snippet,
            url: item.link,
            display_url: item.display_link,
        }
    }
}
