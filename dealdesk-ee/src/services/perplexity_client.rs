//! Perplexity chat-completions client
//!
//! Primary research provider: answers research prompts with live web
//! grounding and returns citation URLs alongside the text.

use crate::services::providers::{ProviderError, ResearchOutput, ResearchProvider};
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;

const PERPLEXITY_BASE_URL: &str = "https://api.perplexity.ai/chat/completions";
const PERPLEXITY_MODEL: &str = "sonar-pro";
const REQUEST_TIMEOUT_SECS: u64 = 25;
const REQUESTS_PER_SECOND: u32 = 1;

#[derive(Debug, Deserialize)]
struct PerplexityResponse {
    choices: Vec<PerplexityChoice>,
    #[serde(default)]
    citations: Vec<String>,
    #[serde(default)]
    usage: Option<PerplexityUsage>,
}

#[derive(Debug, Deserialize)]
struct PerplexityChoice {
    message: PerplexityMessage,
}

#[derive(Debug, Deserialize)]
struct PerplexityMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct PerplexityUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

/// Perplexity API client
pub struct PerplexityClient {
    http_client: reqwest::Client,
    api_key: String,
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl PerplexityClient {
    pub fn new(api_key: String) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let rate_limiter = RateLimiter::direct(Quota::per_second(
            NonZeroU32::new(REQUESTS_PER_SECOND).expect("non-zero quota"),
        ));

        Ok(Self { http_client, api_key, rate_limiter })
    }
}

#[async_trait]
impl ResearchProvider for PerplexityClient {
    fn name(&self) -> &'static str {
        "perplexity"
    }

    async fn research(&self, prompt: &str) -> Result<ResearchOutput, ProviderError> {
        self.rate_limiter.until_ready().await;

        let body = serde_json::json!({
            "model": PERPLEXITY_MODEL,
            "messages": [
                {"role": "user", "content": prompt}
            ],
        });

        tracing::debug!(model = PERPLEXITY_MODEL, "Querying Perplexity chat completions");

        let response = self
            .http_client
            .post(PERPLEXITY_BASE_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();

        if status == 401 {
            return Err(ProviderError::InvalidApiKey);
        }
        if status == 429 {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(status.as_u16(), error_text));
        }

        let parsed: PerplexityResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let text = parsed
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or(ProviderError::EmptyResponse)?;

        let usage = parsed.usage.unwrap_or_default();

        tracing::info!(
            model = PERPLEXITY_MODEL,
            citations = parsed.citations.len(),
            "Perplexity research completed"
        );

        Ok(ResearchOutput {
            text,
            citations: parsed.citations,
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation_succeeds() {
        assert!(PerplexityClient::new("pplx-test".to_string()).is_ok());
    }

    #[test]
    fn response_parsing_keeps_citations() {
        let raw = r#"{
            "choices": [{"message": {"content": "Research findings."}}],
            "citations": ["https://example.com/a", "https://example.com/b"],
            "usage": {"prompt_tokens": 80, "completion_tokens": 200}
        }"#;
        let parsed: PerplexityResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.citations.len(), 2);
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("Research findings."));
    }

    #[test]
    fn response_parsing_tolerates_missing_citations() {
        let raw = r#"{"choices": [{"message": {"content": "x"}}]}"#;
        let parsed: PerplexityResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.citations.is_empty());
    }
}
