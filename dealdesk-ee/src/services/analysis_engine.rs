//! Analysis engine
//!
//! Aggregates per-subcategory evidence into category and overall scores for
//! a deal, and assembles the IC memo. Evidence comes from the industry
//! baselines, upgraded in place by extracted enrichment metrics where a
//! healthy pack covered the category. Scores combine weight-proportionally;
//! confidences average unweighted.

use crate::models::analysis::{
    AnalysisResult, CategoryScore, IcMemo, NarrativeSection, SubcategoryScore,
};
use crate::models::enrichment::{EnrichmentResult, PackData, PackPlan};
use crate::services::baseline_generator::{
    score_growth_pct, score_tam_billions, BaselineCatalog, BaselineContext,
};
use crate::services::industry_classifier::{
    IndustryCatalog, DEFAULT_MIN_ALIGNMENT_CONFIDENCE,
};
use dealdesk_common::criteria::{
    average_confidence, weighted_category_score, CriteriaTemplate, RagStatus, ScoreBand,
    WeightedEvidence, NEUTRAL_SCORE,
};
use dealdesk_common::db::models::{Deal, Fund};
use dealdesk_common::events::{DealEvent, EventBus};
use dealdesk_common::{Error, Result};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Shared immutable reference data plus the aggregation logic
pub struct AnalysisEngine {
    industries: Arc<IndustryCatalog>,
    baselines: Arc<BaselineCatalog>,
}

impl AnalysisEngine {
    pub fn new(industries: Arc<IndustryCatalog>, baselines: Arc<BaselineCatalog>) -> Self {
        Self { industries, baselines }
    }

    /// Compute a full analysis from the template and whatever enrichment
    /// results exist. Pure function; persistence is the caller's concern.
    pub fn compute(
        &self,
        deal: &Deal,
        fund: &Fund,
        template: &CriteriaTemplate,
        enrichment: &[EnrichmentResult],
    ) -> AnalysisResult {
        let resolved = self.industries.find_best_match(&deal.industry);
        let canonical = resolved
            .as_ref()
            .map(|m| m.industry.clone())
            .unwrap_or_else(|| deal.industry.clone());

        let context = BaselineContext {
            has_company_context: deal.has_company_context(),
            has_financial_data: deal.has_financial_data(),
        };

        let by_pack: HashMap<&str, &EnrichmentResult> =
            enrichment.iter().map(|r| (r.pack_name.as_str(), r)).collect();

        let mut category_scores = Vec::new();
        let mut all_evidence = Vec::new();

        for category in template.enabled_categories() {
            let pack_name =
                crate::models::enrichment::pack_name(template.fund_type, &category.name);
            let pack = by_pack
                .get(pack_name.as_str())
                .copied()
                .filter(|r| !r.is_degraded());

            let mut sub_scores = Vec::new();
            let mut evidence = Vec::new();

            for sub in category.enabled_subcategories() {
                let mut base = self.baselines.baseline_analysis(
                    &canonical,
                    &sub.name,
                    template.fund_type,
                    &context,
                );

                if let Some(pack) = pack {
                    apply_pack_override(&mut base, &sub.name, pack);
                }

                evidence.push(WeightedEvidence {
                    weight: sub.weight,
                    score: base.score,
                    confidence: base.confidence,
                });
                sub_scores.push(SubcategoryScore {
                    name: sub.name.clone(),
                    weight: sub.weight,
                    score: base.score,
                    confidence: base.confidence,
                    reasoning: base.reasoning,
                    warnings: base.warnings,
                });
            }

            let score = weighted_category_score(&evidence);
            category_scores.push(CategoryScore {
                name: category.name.clone(),
                weight: category.weight,
                score,
                band: ScoreBand::from_score(score),
                average_confidence: average_confidence(&evidence),
                subcategories: sub_scores,
            });
            all_evidence.extend(evidence);
        }

        let overall_score = overall_from_categories(&category_scores);
        let narrative = build_narrative(&category_scores, resolved.as_ref().map(|m| m.reason.as_str()));

        tracing::debug!(
            deal_id = %deal.id,
            fund_id = %fund.id,
            overall = overall_score,
            categories = category_scores.len(),
            "Analysis computed"
        );

        AnalysisResult {
            deal_id: deal.id,
            category_scores,
            overall_score,
            overall_band: ScoreBand::from_score(overall_score),
            rag_status: RagStatus::from_score(overall_score),
            average_confidence: average_confidence(&all_evidence),
            resolved_industry: resolved.map(|m| m.industry),
            narrative,
            generated_at: chrono::Utc::now(),
        }
    }

    /// Assemble the IC memo from an analysis
    pub fn build_memo(&self, deal: &Deal, fund: &Fund, analysis: &AnalysisResult) -> IcMemo {
        let alignment = self.industries.are_industries_aligned(
            &deal.industry,
            &fund.focus_industries,
            DEFAULT_MIN_ALIGNMENT_CONFIDENCE,
        );

        let strengths: Vec<String> = analysis
            .category_scores
            .iter()
            .filter(|c| c.score >= 70.0)
            .map(|c| format!("{} ({:.0})", c.name, c.score))
            .collect();

        let mut concerns: Vec<String> = analysis
            .category_scores
            .iter()
            .filter(|c| c.score < 50.0)
            .map(|c| format!("{} ({:.0})", c.name, c.score))
            .collect();
        for category in &analysis.category_scores {
            for sub in &category.subcategories {
                concerns.extend(sub.warnings.iter().cloned());
            }
        }
        concerns.truncate(8);

        IcMemo {
            deal_id: deal.id,
            summary: format!(
                "{} scores {:.1} ({}) against the {} criteria template of {}",
                deal.name,
                analysis.overall_score,
                analysis.overall_band.as_str(),
                fund.fund_type.as_str(),
                fund.name
            ),
            strengths,
            concerns,
            alignment: alignment.explanation,
            overall_score: analysis.overall_score,
            rag_status: analysis.rag_status,
            updated_at: chrono::Utc::now(),
        }
    }

    /// Load everything for a deal, recompute, persist analysis + memo, and
    /// broadcast the update. Used by the analyze endpoint and the
    /// post-enrichment re-score trigger.
    pub async fn recompute_and_store(
        &self,
        pool: &SqlitePool,
        event_bus: &EventBus,
        deal_id: Uuid,
    ) -> Result<AnalysisResult> {
        let deal = crate::db::deals::get_deal(pool, deal_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Deal not found: {}", deal_id)))?;
        let fund = crate::db::deals::get_fund(pool, deal.fund_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Fund not found: {}", deal.fund_id)))?;

        let template = match crate::db::strategies::load_strategy(pool, fund.id).await? {
            Some((template, _)) => template,
            None => dealdesk_common::criteria::default_template(fund.fund_type),
        };
        let enrichment = crate::db::enrichment::load_results(pool, deal_id).await?;

        let analysis = self.compute(&deal, &fund, &template, &enrichment);
        crate::db::analysis::save_analysis(pool, &analysis).await?;

        let memo = self.build_memo(&deal, &fund, &analysis);
        crate::db::analysis::save_memo(pool, &memo).await?;

        event_bus.emit(DealEvent::AnalysisUpdated {
            deal_id,
            overall_score: analysis.overall_score,
            timestamp: chrono::Utc::now(),
        });

        tracing::info!(
            deal_id = %deal_id,
            overall = analysis.overall_score,
            rag = analysis.rag_status.as_str(),
            "Analysis persisted"
        );

        Ok(analysis)
    }
}

/// Upgrade a baseline evidence tuple in place when a healthy pack extracted
/// a concrete figure for this criterion
fn apply_pack_override(
    base: &mut crate::services::baseline_generator::BaselineEvidence,
    criterion: &str,
    pack: &EnrichmentResult,
) {
    if let PackData::Market(metrics) = &pack.data {
        match criterion {
            "Market Size (TAM)" => {
                if let Some(tam) = metrics.tam.value {
                    base.score = score_tam_billions(tam);
                    base.confidence = pack.confidence;
                    base.reasoning =
                        format!("Research sizes the market at {} ({})", metrics.tam.text, metrics.tam.raw_text);
                }
            }
            "Market Growth Rate" => {
                if let Some(pct) = metrics.growth_rate.value {
                    base.score = score_growth_pct(pct);
                    base.confidence = pack.confidence;
                    base.reasoning =
                        format!("Research reports growth of {}", metrics.growth_rate.text);
                }
            }
            _ => {}
        }
    }
}

/// Weight-proportional overall score over enabled categories
fn overall_from_categories(categories: &[CategoryScore]) -> f64 {
    let total_weight: f64 = categories.iter().map(|c| c.weight).sum();
    if total_weight <= 0.0 {
        return NEUTRAL_SCORE;
    }
    categories.iter().map(|c| c.score * c.weight).sum::<f64>() / total_weight
}

fn build_narrative(
    categories: &[CategoryScore],
    industry_reason: Option<&str>,
) -> Vec<NarrativeSection> {
    let mut sections = Vec::new();

    if let Some(reason) = industry_reason {
        sections.push(NarrativeSection {
            title: "Industry".to_string(),
            body: reason.to_string(),
        });
    }

    for category in categories {
        let mut lines: Vec<String> = category
            .subcategories
            .iter()
            .filter(|s| !s.reasoning.is_empty())
            .map(|s| s.reasoning.clone())
            .collect();
        lines.extend(
            category
                .subcategories
                .iter()
                .flat_map(|s| s.warnings.iter().map(|w| format!("Caution: {}", w))),
        );
        if lines.is_empty() {
            lines.push("Awaiting company-level evidence for this category.".to_string());
        }
        sections.push(NarrativeSection {
            title: category.name.clone(),
            body: lines.join(" "),
        });
    }

    sections
}

/// Build pack plans for a deal's template; exposed for the enrich handler
pub fn plan_packs(template: &CriteriaTemplate, requested: Option<&[String]>) -> Vec<PackPlan> {
    let plans = PackPlan::for_template(template);
    match requested {
        Some(names) if !names.is_empty() => plans
            .into_iter()
            .filter(|p| names.iter().any(|n| n == &p.name))
            .collect(),
        _ => plans,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enrichment::{ExtractedMetric, MarketMetrics, NOT_AVAILABLE};
    use dealdesk_common::criteria::{default_template, FundType};

    fn engine() -> AnalysisEngine {
        AnalysisEngine::new(
            Arc::new(IndustryCatalog::builtin()),
            Arc::new(BaselineCatalog::builtin()),
        )
    }

    fn fund() -> Fund {
        Fund {
            id: Uuid::new_v4(),
            name: "Meridian Ventures I".to_string(),
            fund_type: FundType::Vc,
            focus_industries: vec!["Financial Services".to_string()],
            created_at: chrono::Utc::now(),
        }
    }

    fn deal(fund: &Fund, industry: &str) -> Deal {
        Deal {
            id: Uuid::new_v4(),
            fund_id: fund.id,
            name: "Acme Payments".to_string(),
            industry: industry.to_string(),
            stage: "Series A".to_string(),
            geography: "US".to_string(),
            description: Some("Embedded payments".to_string()),
            website: None,
            financials: None,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn compute_resolves_industry_and_scores_every_enabled_category() {
        let engine = engine();
        let fund = fund();
        let deal = deal(&fund, "fintech");
        let template = default_template(FundType::Vc);

        let analysis = engine.compute(&deal, &fund, &template, &[]);

        assert_eq!(analysis.resolved_industry.as_deref(), Some("Financial Services"));
        assert_eq!(analysis.category_scores.len(), 5);
        assert!(analysis.overall_score > 0.0 && analysis.overall_score <= 100.0);
        // Industry section plus one per category
        assert_eq!(analysis.narrative.len(), 6);
    }

    #[test]
    fn healthy_market_pack_overrides_baseline_tam_evidence() {
        let engine = engine();
        let fund = fund();
        let deal = deal(&fund, "fintech");
        let template = default_template(FundType::Vc);

        let pack = EnrichmentResult {
            deal_id: deal.id,
            pack_name: "vc_market_opportunity".to_string(),
            data: PackData::Market(MarketMetrics {
                tam: ExtractedMetric::found("$1500.0B TAM".into(), Some(1500.0), "$1.5 trillion TAM".into()),
                sam: ExtractedMetric::missing(NOT_AVAILABLE),
                growth_rate: ExtractedMetric::missing(NOT_AVAILABLE),
            }),
            sources: vec!["https://example.com".to_string()],
            confidence: 85.0,
            completed_at: chrono::Utc::now(),
        };

        let analysis = engine.compute(&deal, &fund, &template, &[pack]);
        let market = analysis
            .category_scores
            .iter()
            .find(|c| c.name == "Market Opportunity")
            .unwrap();
        let tam = market.subcategories.iter().find(|s| s.name == "Market Size (TAM)").unwrap();
        assert_eq!(tam.score, 75.0);
        assert_eq!(tam.confidence, 85.0);
        assert!(tam.reasoning.contains("$1500.0B"));
    }

    #[test]
    fn degraded_pack_does_not_override_baselines() {
        let engine = engine();
        let fund = fund();
        let deal = deal(&fund, "fintech");
        let template = default_template(FundType::Vc);

        let degraded = EnrichmentResult {
            deal_id: deal.id,
            pack_name: "vc_market_opportunity".to_string(),
            data: PackData::Raw { text: "provider unavailable".to_string() },
            sources: vec!["error-fallback".to_string()],
            confidence: 20.0,
            completed_at: chrono::Utc::now(),
        };

        let with = engine.compute(&deal, &fund, &template, &[degraded]);
        let without = engine.compute(&deal, &fund, &template, &[]);
        let pick = |a: &AnalysisResult| {
            a.category_scores
                .iter()
                .find(|c| c.name == "Market Opportunity")
                .unwrap()
                .score
        };
        assert_eq!(pick(&with), pick(&without));
    }

    #[test]
    fn memo_collects_strengths_concerns_and_alignment() {
        let engine = engine();
        let fund = fund();
        let deal = deal(&fund, "fintech");
        let template = default_template(FundType::Vc);

        let analysis = engine.compute(&deal, &fund, &template, &[]);
        let memo = engine.build_memo(&deal, &fund, &analysis);

        assert!(memo.summary.contains("Acme Payments"));
        assert!(memo.alignment.contains("Financial Services"));
        assert_eq!(memo.rag_status, analysis.rag_status);
    }

    #[test]
    fn unknown_industry_still_produces_a_complete_analysis() {
        let engine = engine();
        let fund = fund();
        let deal = deal(&fund, "interpretive dance studios");
        let template = default_template(FundType::Vc);

        let analysis = engine.compute(&deal, &fund, &template, &[]);
        assert!(analysis.resolved_industry.is_none());
        assert_eq!(analysis.category_scores.len(), 5);
        // Generic baseline everywhere: every subcategory sits at neutral
        for category in &analysis.category_scores {
            assert_eq!(category.score, 50.0);
        }
    }

    #[test]
    fn plan_packs_filters_by_requested_names() {
        let template = default_template(FundType::Vc);
        let all = plan_packs(&template, None);
        assert_eq!(all.len(), 5);

        let requested = vec!["vc_market_opportunity".to_string()];
        let filtered = plan_packs(&template, Some(&requested));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "vc_market_opportunity");
    }

    #[tokio::test]
    async fn recompute_and_store_persists_analysis_and_memo() {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        dealdesk_common::db::init_tables(&pool).await.unwrap();
        let event_bus = EventBus::new(16);

        let fund = fund();
        let deal = deal(&fund, "fintech");
        crate::db::deals::insert_fund(&pool, &fund).await.unwrap();
        crate::db::deals::insert_deal(&pool, &deal).await.unwrap();

        let engine = engine();
        let mut rx = event_bus.subscribe();
        let analysis = engine.recompute_and_store(&pool, &event_bus, deal.id).await.unwrap();

        let stored = crate::db::analysis::load_analysis(&pool, deal.id).await.unwrap().unwrap();
        assert_eq!(stored.overall_score, analysis.overall_score);
        assert!(crate::db::analysis::load_memo(&pool, deal.id).await.unwrap().is_some());

        match rx.recv().await.unwrap() {
            DealEvent::AnalysisUpdated { deal_id, .. } => assert_eq!(deal_id, deal.id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn recompute_for_missing_deal_is_not_found() {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        dealdesk_common::db::init_tables(&pool).await.unwrap();
        let engine = engine();
        let result = engine
            .recompute_and_store(&pool, &EventBus::new(4), Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
