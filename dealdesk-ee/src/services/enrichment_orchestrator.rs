//! Enrichment orchestrator
//!
//! Runs a deal's enrichment packs against the external research providers
//! with bounded concurrency, a per-pack timeout, and per-pack error
//! containment: a pack that times out or whose provider fails still yields a
//! stored result, with confidence forced low and a fallback source marker.
//! Only the caller's failure to supply a deal aborts a run; provider
//! failures never propagate.
//!
//! After every run — healthy or degraded — re-scoring fires as a detached
//! task; its failure is logged, not surfaced. There is no retry anywhere: a
//! degraded pack stays degraded until the user re-triggers it.

use crate::models::enrichment::{EnrichmentResult, PackData, PackKind, PackPlan};
use crate::services::analysis_engine::AnalysisEngine;
use crate::services::metric_extractor;
use crate::services::providers::ProviderSet;
use dealdesk_common::db::models::Deal;
use dealdesk_common::events::{DealEvent, EventBus};
use dealdesk_common::Result;
use futures::stream::StreamExt;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

/// Default concurrent packs in flight
const DEFAULT_PACK_CONCURRENCY: usize = 3;
/// Per-pack wall-clock budget
const DEFAULT_PACK_TIMEOUT: Duration = Duration::from_secs(25);
/// Stored results at or above this confidence are reused unless the caller
/// forces a refresh
const REFRESH_CONFIDENCE_FLOOR: f64 = 50.0;

const DEGRADED_ERROR_CONFIDENCE: f64 = 20.0;
const DEGRADED_TIMEOUT_CONFIDENCE: f64 = 25.0;

pub struct EnrichmentOrchestrator {
    pool: SqlitePool,
    event_bus: EventBus,
    providers: ProviderSet,
    engine: Arc<AnalysisEngine>,
    pack_concurrency: usize,
    pack_timeout: Duration,
}

impl EnrichmentOrchestrator {
    pub fn new(
        pool: SqlitePool,
        event_bus: EventBus,
        providers: ProviderSet,
        engine: Arc<AnalysisEngine>,
    ) -> Self {
        Self {
            pool,
            event_bus,
            providers,
            engine,
            pack_concurrency: DEFAULT_PACK_CONCURRENCY,
            pack_timeout: DEFAULT_PACK_TIMEOUT,
        }
    }

    /// Override concurrency and timeout (configuration and tests)
    pub fn with_limits(mut self, pack_concurrency: usize, pack_timeout: Duration) -> Self {
        self.pack_concurrency = pack_concurrency.max(1);
        self.pack_timeout = pack_timeout;
        self
    }

    /// Run all planned packs for a deal. Always returns one result per plan,
    /// mixing healthy and degraded entries.
    pub async fn run(
        &self,
        deal: &Deal,
        plans: Vec<PackPlan>,
        force_refresh: bool,
    ) -> Result<Vec<EnrichmentResult>> {
        self.event_bus.emit(DealEvent::EnrichmentStarted {
            deal_id: deal.id,
            packs: plans.iter().map(|p| p.name.clone()).collect(),
            timestamp: chrono::Utc::now(),
        });
        tracing::info!(deal_id = %deal.id, packs = plans.len(), force_refresh, "Enrichment run started");

        let results: Vec<EnrichmentResult> = futures::stream::iter(plans)
            .map(|plan| self.run_pack(deal, plan, force_refresh))
            .buffer_unordered(self.pack_concurrency)
            .collect()
            .await;

        let degraded = results.iter().filter(|r| r.is_degraded()).count();
        self.event_bus.emit(DealEvent::EnrichmentCompleted {
            deal_id: deal.id,
            packs_total: results.len(),
            packs_degraded: degraded,
            timestamp: chrono::Utc::now(),
        });
        tracing::info!(
            deal_id = %deal.id,
            total = results.len(),
            degraded,
            "Enrichment run completed"
        );

        // Unconditional fire-and-forget re-score; failures are logged only.
        let engine = Arc::clone(&self.engine);
        let pool = self.pool.clone();
        let event_bus = self.event_bus.clone();
        let deal_id = deal.id;
        tokio::spawn(async move {
            if let Err(e) = engine.recompute_and_store(&pool, &event_bus, deal_id).await {
                tracing::error!(deal_id = %deal_id, error = %e, "Post-enrichment re-score failed");
            }
        });

        Ok(results)
    }

    /// Run one pack to a result, never to an error
    async fn run_pack(&self, deal: &Deal, plan: PackPlan, force_refresh: bool) -> EnrichmentResult {
        if !force_refresh {
            match crate::db::enrichment::load_result(&self.pool, deal.id, &plan.name).await {
                Ok(Some(existing)) if existing.confidence >= REFRESH_CONFIDENCE_FLOOR => {
                    tracing::debug!(deal_id = %deal.id, pack = %plan.name, "Reusing stored pack result");
                    return existing;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(pack = %plan.name, error = %e, "Stored-result lookup failed; refreshing");
                }
            }
        }

        let result = match tokio::time::timeout(self.pack_timeout, self.execute_pack(deal, &plan))
            .await
        {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                tracing::warn!(deal_id = %deal.id, pack = %plan.name, error = %e, "Pack degraded after provider error");
                degraded_result(deal, &plan, "error-fallback", DEGRADED_ERROR_CONFIDENCE, &e.to_string())
            }
            Err(_) => {
                tracing::warn!(
                    deal_id = %deal.id,
                    pack = %plan.name,
                    timeout_secs = self.pack_timeout.as_secs(),
                    "Pack degraded after timeout"
                );
                degraded_result(
                    deal,
                    &plan,
                    "fallback",
                    DEGRADED_TIMEOUT_CONFIDENCE,
                    &format!("research timed out after {}s", self.pack_timeout.as_secs()),
                )
            }
        };

        if let Err(e) = crate::db::enrichment::upsert_result(&self.pool, &result).await {
            tracing::error!(pack = %plan.name, error = %e, "Failed to persist pack result");
        }

        self.event_bus.emit(DealEvent::PackCompleted {
            deal_id: deal.id,
            pack_name: plan.name.clone(),
            confidence: result.confidence,
            degraded: result.is_degraded(),
            timestamp: chrono::Utc::now(),
        });

        result
    }

    /// The fallible inner pack pipeline: research, search, synthesis,
    /// extraction
    async fn execute_pack(&self, deal: &Deal, plan: &PackPlan) -> anyhow::Result<EnrichmentResult> {
        let research_prompt = build_research_prompt(deal, plan);
        let research = self.providers.research.research(&research_prompt).await?;
        self.record_cost(deal, self.providers.research.name(), &research).await;

        let mut sources = research.citations.clone();

        // Supplementary web search pads out thin citation lists; its failure
        // never degrades the pack.
        if sources.len() < 2 {
            if let Some(search) = &self.providers.search {
                let query = format!("{} {}", deal.name, plan.keywords.join(" "));
                match search.search(&query, 3).await {
                    Ok(hits) => sources.extend(hits.into_iter().map(|h| h.url)),
                    Err(e) => {
                        tracing::warn!(pack = %plan.name, error = %e, "Supplementary search failed")
                    }
                }
            }
        }

        let synthesis_prompt = build_synthesis_prompt(plan, &research.text);
        let synthesis = self.providers.synthesis.research(&synthesis_prompt).await?;
        self.record_cost(deal, self.providers.synthesis.name(), &synthesis).await;

        let combined = format!("{}\n{}", research.text, synthesis.text);
        let (data, extracted_primary) = extract_pack_data(plan.kind, &combined);

        let mut confidence: f64 = 55.0;
        if !sources.is_empty() {
            confidence += 20.0;
        }
        if extracted_primary {
            confidence += 15.0;
        }

        Ok(EnrichmentResult {
            deal_id: deal.id,
            pack_name: plan.name.clone(),
            data,
            sources,
            confidence: confidence.min(90.0),
            completed_at: chrono::Utc::now(),
        })
    }

    async fn record_cost(
        &self,
        deal: &Deal,
        provider: &str,
        output: &crate::services::providers::ResearchOutput,
    ) {
        if let Err(e) = crate::db::costs::record_cost(
            &self.pool,
            deal.id,
            provider,
            output.prompt_tokens,
            output.completion_tokens,
        )
        .await
        {
            tracing::warn!(provider, error = %e, "Cost tracking insert failed");
        }
    }
}

fn degraded_result(
    deal: &Deal,
    plan: &PackPlan,
    marker: &str,
    confidence: f64,
    reason: &str,
) -> EnrichmentResult {
    EnrichmentResult {
        deal_id: deal.id,
        pack_name: plan.name.clone(),
        data: PackData::Raw {
            text: format!("Enrichment unavailable for {}: {}", plan.category, reason),
        },
        sources: vec![marker.to_string()],
        confidence,
        completed_at: chrono::Utc::now(),
    }
}

/// Extract the pack's typed payload; the flag reports whether the kind's
/// primary signal was actually found
fn extract_pack_data(kind: PackKind, text: &str) -> (PackData, bool) {
    match kind {
        PackKind::Market => {
            let metrics = metric_extractor::extract_market_metrics(text);
            let found = metrics.tam.is_found() || metrics.growth_rate.is_found();
            (PackData::Market(metrics), found)
        }
        PackKind::Financial => {
            let metrics = metric_extractor::extract_financial_metrics(text);
            let found = metrics.total_raised.is_found()
                || metrics.revenue.is_found()
                || metrics.burn_rate.is_found();
            (PackData::Financial(metrics), found)
        }
        PackKind::Competitive => {
            let data = metric_extractor::extract_competitive_data(text);
            let found = !data.competitors.is_empty() || data.positioning.is_found();
            (PackData::Competitive(data), found)
        }
        PackKind::Team => {
            let team = metric_extractor::extract_team_assessment(text);
            let found = team.leadership.is_found();
            (PackData::Team(team), found)
        }
        PackKind::General => (PackData::Raw { text: text.to_string() }, false),
    }
}

fn build_research_prompt(deal: &Deal, plan: &PackPlan) -> String {
    let mut prompt = format!(
        "Research the company \"{}\" ({} / {} / {}) for an investment evaluation of its {}.\n",
        deal.name, deal.industry, deal.stage, deal.geography, plan.category
    );
    if let Some(description) = &deal.description {
        prompt.push_str(&format!("Company description: {}\n", description));
    }
    if let Some(website) = &deal.website {
        prompt.push_str(&format!("Website: {}\n", website));
    }
    prompt.push_str(&format!("Focus on: {}.\n", plan.keywords.join(", ")));
    prompt.push_str(match plan.kind {
        PackKind::Market => {
            "State the total addressable market in dollars, the market growth rate as a percentage CAGR, and the serviceable market if known."
        }
        PackKind::Financial => {
            "State total capital raised, annual revenue, and monthly burn rate in dollars where known."
        }
        PackKind::Competitive => {
            "Name the main competitors and describe how the company is positioned against them."
        }
        PackKind::Team => {
            "Describe the founders' backgrounds and state the team headcount if known."
        }
        PackKind::General => "Summarize the most relevant findings for this evaluation category.",
    });
    prompt
}

fn build_synthesis_prompt(plan: &PackPlan, research_text: &str) -> String {
    format!(
        "Condense the following research into a short factual assessment of the company's {}. \
         Keep concrete figures (dollar amounts, percentages, counts) verbatim.\n\n{}",
        plan.category, research_text
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::baseline_generator::BaselineCatalog;
    use crate::services::industry_classifier::IndustryCatalog;
    use crate::services::providers::{
        ProviderError, ResearchOutput, ResearchProvider, SearchHit, WebSearchProvider,
    };
    use async_trait::async_trait;
    use dealdesk_common::criteria::{default_template, FundType};
    use dealdesk_common::db::models::Fund;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    /// Research stub: fails or stalls when the prompt mentions a marker
    struct StubResearch {
        text: String,
        citations: Vec<String>,
        fail_on: Option<String>,
        stall_on: Option<String>,
        calls: AtomicUsize,
    }

    impl StubResearch {
        fn healthy(text: &str) -> Self {
            Self {
                text: text.to_string(),
                citations: vec!["https://example.com/report".to_string()],
                fail_on: None,
                stall_on: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ResearchProvider for StubResearch {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn research(&self, prompt: &str) -> std::result::Result<ResearchOutput, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(marker) = &self.fail_on {
                if prompt.contains(marker.as_str()) {
                    return Err(ProviderError::Api(503, "upstream unavailable".to_string()));
                }
            }
            if let Some(marker) = &self.stall_on {
                if prompt.contains(marker.as_str()) {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                }
            }
            Ok(ResearchOutput {
                text: self.text.clone(),
                citations: self.citations.clone(),
                prompt_tokens: 100,
                completion_tokens: 250,
            })
        }
    }

    struct StubSearch;

    #[async_trait]
    impl WebSearchProvider for StubSearch {
        async fn search(&self, _query: &str, _limit: usize) -> std::result::Result<Vec<SearchHit>, ProviderError> {
            Ok(vec![SearchHit {
                title: "Industry report".to_string(),
                url: "https://example.com/search-hit".to_string(),
                snippet: String::new(),
            }])
        }
    }

    const MARKET_TEXT: &str =
        "The company targets a $12 billion TAM, growing at 22% CAGR. It competes with Stripe, Adyen.";

    async fn setup() -> (SqlitePool, EventBus, Arc<AnalysisEngine>, Deal, Fund) {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        dealdesk_common::db::init_tables(&pool).await.unwrap();
        let event_bus = EventBus::new(64);
        let engine = Arc::new(AnalysisEngine::new(
            Arc::new(IndustryCatalog::builtin()),
            Arc::new(BaselineCatalog::builtin()),
        ));

        let fund = Fund {
            id: Uuid::new_v4(),
            name: "Meridian Ventures I".to_string(),
            fund_type: FundType::Vc,
            focus_industries: vec!["Financial Services".to_string()],
            created_at: chrono::Utc::now(),
        };
        let deal = Deal {
            id: Uuid::new_v4(),
            fund_id: fund.id,
            name: "Acme Payments".to_string(),
            industry: "fintech".to_string(),
            stage: "Series A".to_string(),
            geography: "US".to_string(),
            description: None,
            website: None,
            financials: None,
            created_at: chrono::Utc::now(),
        };
        crate::db::deals::insert_fund(&pool, &fund).await.unwrap();
        crate::db::deals::insert_deal(&pool, &deal).await.unwrap();
        (pool, event_bus, engine, deal, fund)
    }

    fn providers(research: StubResearch) -> ProviderSet {
        ProviderSet {
            research: Arc::new(research),
            synthesis: Arc::new(StubResearch::healthy("Synthesis summary.")),
            search: Some(Arc::new(StubSearch)),
        }
    }

    #[tokio::test]
    async fn healthy_run_produces_one_result_per_pack() {
        let (pool, event_bus, engine, deal, _fund) = setup().await;
        let orchestrator = EnrichmentOrchestrator::new(
            pool.clone(),
            event_bus,
            providers(StubResearch::healthy(MARKET_TEXT)),
            engine,
        );

        let plans = PackPlan::for_template(&default_template(FundType::Vc));
        let results = orchestrator.run(&deal, plans, false).await.unwrap();

        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|r| !r.is_degraded()));
        assert!(results.iter().all(|r| r.confidence >= 55.0));

        let stored = crate::db::enrichment::load_results(&pool, deal.id).await.unwrap();
        assert_eq!(stored.len(), 5);
    }

    #[tokio::test]
    async fn failing_pack_degrades_while_others_stay_healthy() {
        let (pool, event_bus, engine, deal, _fund) = setup().await;
        let mut research = StubResearch::healthy(MARKET_TEXT);
        research.fail_on = Some("Market Opportunity".to_string());
        let orchestrator =
            EnrichmentOrchestrator::new(pool.clone(), event_bus, providers(research), engine);

        let plans = PackPlan::for_template(&default_template(FundType::Vc));
        let results = orchestrator.run(&deal, plans, false).await.unwrap();

        let market = results.iter().find(|r| r.pack_name == "vc_market_opportunity").unwrap();
        assert!(market.is_degraded());
        assert!(market.confidence <= 25.0);
        assert_eq!(market.sources, vec!["error-fallback"]);
        assert!(matches!(&market.data, PackData::Raw { text } if text.contains("unavailable")));

        let healthy = results.iter().filter(|r| !r.is_degraded()).count();
        assert_eq!(healthy, 4, "other packs are unaffected");
    }

    #[tokio::test]
    async fn stalled_pack_times_out_to_fallback() {
        let (pool, event_bus, engine, deal, _fund) = setup().await;
        let mut research = StubResearch::healthy(MARKET_TEXT);
        research.stall_on = Some("Market Opportunity".to_string());
        let orchestrator =
            EnrichmentOrchestrator::new(pool.clone(), event_bus, providers(research), engine)
                .with_limits(3, Duration::from_millis(100));

        let plans = PackPlan::for_template(&default_template(FundType::Vc));
        let results = orchestrator.run(&deal, plans, false).await.unwrap();

        let market = results.iter().find(|r| r.pack_name == "vc_market_opportunity").unwrap();
        assert_eq!(market.sources, vec!["fallback"]);
        assert_eq!(market.confidence, 25.0);
    }

    #[tokio::test]
    async fn stored_healthy_results_are_reused_unless_forced() {
        let (pool, event_bus, engine, deal, _fund) = setup().await;
        let research = StubResearch::healthy(MARKET_TEXT);
        let orchestrator = EnrichmentOrchestrator::new(
            pool.clone(),
            event_bus,
            providers(research),
            engine,
        );

        let template = default_template(FundType::Vc);
        let plans = PackPlan::for_template(&template);
        let first = orchestrator.run(&deal, plans.clone(), false).await.unwrap();

        // Second run without force_refresh reuses every stored result verbatim
        let second = orchestrator.run(&deal, plans.clone(), false).await.unwrap();
        for result in &second {
            let prior = first.iter().find(|f| f.pack_name == result.pack_name).unwrap();
            assert_eq!(result.completed_at, prior.completed_at, "{} was re-run", result.pack_name);
        }

        // Forced run produces fresh timestamps
        let third = orchestrator.run(&deal, plans, true).await.unwrap();
        for result in &third {
            let prior = first.iter().find(|f| f.pack_name == result.pack_name).unwrap();
            assert!(result.completed_at >= prior.completed_at);
        }
    }

    #[tokio::test]
    async fn run_triggers_rescore_and_cost_tracking() {
        let (pool, event_bus, engine, deal, _fund) = setup().await;
        let orchestrator = EnrichmentOrchestrator::new(
            pool.clone(),
            event_bus,
            providers(StubResearch::healthy(MARKET_TEXT)),
            engine,
        );

        let plans = PackPlan::for_template(&default_template(FundType::Vc));
        orchestrator.run(&deal, plans, false).await.unwrap();

        assert!(crate::db::costs::total_tokens(&pool, deal.id).await.unwrap() > 0);

        // Re-score is fire-and-forget; poll briefly for the persisted row
        let mut analysis = None;
        for _ in 0..50 {
            analysis = crate::db::analysis::load_analysis(&pool, deal.id).await.unwrap();
            if analysis.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(analysis.is_some(), "post-enrichment re-score persisted an analysis");
    }

    #[test]
    fn extraction_flags_primary_signal_per_kind() {
        let (data, found) = extract_pack_data(PackKind::Market, MARKET_TEXT);
        assert!(found);
        assert!(matches!(data, PackData::Market(_)));

        let (_, none_found) = extract_pack_data(PackKind::Market, "no figures here");
        assert!(!none_found);

        let (general, found) = extract_pack_data(PackKind::General, "plain text");
        assert!(matches!(general, PackData::Raw { .. }));
        assert!(!found);
    }
}
