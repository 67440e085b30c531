//! OpenAI chat-completions client
//!
//! Used as the synthesis provider: condenses raw research text into a
//! criterion-oriented assessment. Model name is pinned; rate limited with a
//! token-bucket quota.

use crate::services::providers::{ProviderError, ResearchOutput, ResearchProvider};
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
const OPENAI_MODEL: &str = "gpt-4o-mini";
const REQUEST_TIMEOUT_SECS: u64 = 20;
const REQUESTS_PER_SECOND: u32 = 2;

/// OpenAI chat-completions response (the fields we read)
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

/// OpenAI API client
pub struct OpenAiClient {
    http_client: reqwest::Client,
    api_key: String,
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl OpenAiClient {
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
impl ResearchProvider for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn research(&self, prompt: &str) -> Result<ResearchOutput, ProviderError> {
        self.rate_limiter.until_ready().await;

        let body = serde_json::json!({
            "model": OPENAI_MODEL,
            "messages": [
                {"role": "user", "content": prompt}
            ],
            "temperature": 0.2,
        });

        tracing::debug!(model = OPENAI_MODEL, "Querying OpenAI chat completions");

        let response = self
            .http_client
            .post(OPENAI_BASE_URL)
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

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let text = chat
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or(ProviderError::EmptyResponse)?;

        let usage = chat.usage.unwrap_or_default();

        tracing::info!(
            model = OPENAI_MODEL,
            completion_tokens = usage.completion_tokens,
            "OpenAI synthesis completed"
        );

        Ok(ResearchOutput {
            text,
            citations: Vec::new(),
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
        assert!(OpenAiClient::new("sk-test".to_string()).is_ok());
    }

    #[test]
    fn response_parsing_reads_first_choice_and_usage() {
        let raw = r#"{
            "choices": [{"message": {"content": "Assessment text."}}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 42}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("Assessment text."));
        assert_eq!(parsed.usage.unwrap().completion_tokens, 42);
    }

    #[test]
    fn response_parsing_tolerates_missing_usage() {
        let raw = r#"{"choices": [{"message": {"content": "x"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.usage.is_none());
    }
}
