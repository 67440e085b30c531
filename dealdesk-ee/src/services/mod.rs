//! Service components for the evaluation engine

pub mod analysis_engine;
pub mod baseline_generator;
pub mod enrichment_orchestrator;
pub mod google_search_client;
pub mod industry_classifier;
pub mod metric_extractor;
pub mod openai_client;
pub mod perplexity_client;
pub mod providers;

pub use analysis_engine::AnalysisEngine;
pub use baseline_generator::{BaselineCatalog, BaselineContext, BaselineEvidence};
pub use enrichment_orchestrator::EnrichmentOrchestrator;
pub use google_search_client::GoogleSearchClient;
pub use industry_classifier::{AlignmentResult, IndustryCatalog, IndustryMatch};
pub use openai_client::OpenAiClient;
pub use perplexity_client::PerplexityClient;
pub use providers::{ProviderSet, ResearchProvider, WebSearchProvider};
