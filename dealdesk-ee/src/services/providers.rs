//! External research provider interfaces
//!
//! Providers are opaque text-in/text-out services; this layer owns request
//! bodies and response parsing only. Trait objects keep the orchestrator
//! testable without the network.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Provider client errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Empty response from provider")]
    EmptyResponse,
}

/// Output of one research/synthesis call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchOutput {
    pub text: String,
    /// Citation URLs when the provider returns them
    pub citations: Vec<String>,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// A text-completion research provider (Perplexity, OpenAI)
#[async_trait]
pub trait ResearchProvider: Send + Sync {
    /// Provider name for logging and cost tracking
    fn name(&self) -> &'static str;

    async fn research(&self, prompt: &str) -> Result<ResearchOutput, ProviderError>;
}

/// One web search hit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// A web search provider (Google Custom Search)
#[async_trait]
pub trait WebSearchProvider: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, ProviderError>;
}

/// The provider bundle the orchestrator runs against
#[derive(Clone)]
pub struct ProviderSet {
    /// Primary research provider (citation-returning)
    pub research: std::sync::Arc<dyn ResearchProvider>,
    /// Synthesis provider for condensing research into assessments
    pub synthesis: std::sync::Arc<dyn ResearchProvider>,
    /// Optional supplementary web search
    pub search: Option<std::sync::Arc<dyn WebSearchProvider>>,
}
