//! Google Custom Search JSON API client
//!
//! Supplementary source discovery: turns pack keywords into a handful of
//! URLs that pad out the citation list.

use crate::services::providers::{ProviderError, SearchHit, WebSearchProvider};
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;

const GOOGLE_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const REQUESTS_PER_SECOND: u32 = 5;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
}

/// Google Custom Search client
pub struct GoogleSearchClient {
    http_client: reqwest::Client,
    api_key: String,
    engine_id: String,
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl GoogleSearchClient {
    pub fn new(api_key: String, engine_id: String) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let rate_limiter = RateLimiter::direct(Quota::per_second(
            NonZeroU32::new(REQUESTS_PER_SECOND).expect("non-zero quota"),
        ));

        Ok(Self { http_client, api_key, engine_id, rate_limiter })
    }
}

#[async_trait]
impl WebSearchProvider for GoogleSearchClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, ProviderError> {
        self.rate_limiter.until_ready().await;

        let num = limit.clamp(1, 10).to_string();
        let params = [
            ("key", self.api_key.as_str()),
            ("cx", self.engine_id.as_str()),
            ("q", query),
            ("num", num.as_str()),
        ];

        tracing::debug!(query = %query, "Querying Google Custom Search");

        let response = self
            .http_client
            .get(GOOGLE_SEARCH_URL)
            .query(&params)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();

        if status == 403 {
            return Err(ProviderError::InvalidApiKey);
        }
        if status == 429 {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(status.as_u16(), error_text));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(parsed
            .items
            .into_iter()
            .map(|item| SearchHit { title: item.title, url: item.link, snippet: item.snippet })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation_succeeds() {
        assert!(GoogleSearchClient::new("key".to_string(), "cx".to_string()).is_ok());
    }

    #[test]
    fn response_parsing_tolerates_empty_result_sets() {
        let parsed: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.items.is_empty());
    }

    #[test]
    fn response_parsing_reads_items() {
        let raw = r#"{"items": [{"title": "Report", "link": "https://example.com", "snippet": "..."}]}"#;
        let parsed: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.items[0].link, "https://example.com");
    }
}
