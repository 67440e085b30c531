//! Baseline evidence generator
//!
//! Produces a plausible (score, confidence, reasoning, warnings) tuple for a
//! (industry, criterion, fund type) triple from a static table of
//! per-industry market facts, for use when no document or research evidence
//! is available yet. Pure function of the table and its inputs.
//!
//! Only criteria whose assessment can be grounded in industry-level facts
//! carry an explicit branch (market sizing, growth, competition, regulation,
//! margins); everything else needs company-level data and falls through to
//! the neutral score with no reasoning.
//!
//! Confidence reflects how much input evidence was supplied, not statistical
//! certainty: 60 base, +15 with a company description or website, +20 with
//! structured financial data, clamped to 95.

use dealdesk_common::criteria::FundType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const BASE_CONFIDENCE: f64 = 60.0;
const CONTEXT_CONFIDENCE_BOOST: f64 = 15.0;
const FINANCIALS_CONFIDENCE_BOOST: f64 = 20.0;
const MAX_CONFIDENCE: f64 = 95.0;
const NEUTRAL_SCORE: f64 = 50.0;

/// Relative pressure level for qualitative baseline fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressureLevel {
    Low,
    Moderate,
    High,
}

/// Static market/financial/competitive facts for one canonical industry
#[derive(Debug, Clone)]
pub struct IndustryBaseline {
    pub industry: String,
    /// Total addressable market, USD billions
    pub tam_billions: f64,
    /// Expected market growth, percent per year
    pub growth_rate_pct: f64,
    pub competitive_intensity: PressureLevel,
    pub regulatory_burden: PressureLevel,
    /// Typical gross margin for the industry, percent
    pub gross_margin_pct: f64,
}

/// Evidence tuple produced for one criterion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineEvidence {
    /// Evidence score (0-100)
    pub score: f64,
    /// Evidence confidence (0-100)
    pub confidence: f64,
    /// Narrative justification; empty for criteria with no explicit branch
    pub reasoning: String,
    pub warnings: Vec<String>,
    /// Suggestions for improving evidence quality
    pub enhancements: Vec<String>,
}

/// Inputs that raise baseline confidence when present
#[derive(Debug, Clone, Copy, Default)]
pub struct BaselineContext {
    /// A company description or website was supplied
    pub has_company_context: bool,
    /// Structured financial data was supplied
    pub has_financial_data: bool,
}

/// Immutable per-industry baseline table, keyed by canonical industry name
pub struct BaselineCatalog {
    baselines: HashMap<String, IndustryBaseline>,
}

impl BaselineCatalog {
    /// Built-in baseline table covering the canonical industry catalog
    pub fn builtin() -> Self {
        let mut baselines = HashMap::new();
        for b in build_baselines() {
            baselines.insert(b.industry.to_lowercase(), b);
        }
        Self { baselines }
    }

    pub fn get(&self, industry: &str) -> Option<&IndustryBaseline> {
        self.baselines.get(&industry.trim().to_lowercase())
    }

    /// Produce baseline evidence for one (industry, criterion, fund type)
    /// triple. Unknown industries yield a fixed generic baseline.
    pub fn baseline_analysis(
        &self,
        industry: &str,
        criterion: &str,
        fund_type: FundType,
        context: &BaselineContext,
    ) -> BaselineEvidence {
        let Some(baseline) = self.get(industry) else {
            return generic_baseline();
        };

        let mut confidence = BASE_CONFIDENCE;
        if context.has_company_context {
            confidence += CONTEXT_CONFIDENCE_BOOST;
        }
        if context.has_financial_data {
            confidence += FINANCIALS_CONFIDENCE_BOOST;
        }
        let confidence = confidence.min(MAX_CONFIDENCE);

        let mut warnings = Vec::new();
        let (score, reasoning) = match criterion.trim() {
            "Market Size (TAM)" => score_tam(baseline, &mut warnings),
            "Market Growth Rate" => score_growth(baseline, fund_type, &mut warnings),
            "Competitive Landscape" => score_competition(baseline, &mut warnings),
            "Regulatory Environment" => score_regulation(baseline, &mut warnings),
            "Unit Economics" => score_margins(baseline, &mut warnings),
            // Criteria without an industry-level heuristic stay neutral and
            // unexplained until real evidence arrives.
            _ => (NEUTRAL_SCORE, String::new()),
        };

        BaselineEvidence {
            score,
            confidence,
            reasoning,
            warnings,
            enhancements: Vec::new(),
        }
    }
}

fn generic_baseline() -> BaselineEvidence {
    BaselineEvidence {
        score: NEUTRAL_SCORE,
        confidence: 50.0,
        reasoning: "No industry baseline available; neutral assumptions applied".to_string(),
        warnings: vec![
            "Industry not recognized; scores are generic placeholders".to_string(),
        ],
        enhancements: vec![
            "Provide a company description or website for richer context".to_string(),
            "Upload structured financial data to ground the financial criteria".to_string(),
            "Run enrichment to gather market research for this industry".to_string(),
        ],
    }
}

/// Score a TAM figure (USD billions) against the fixed market-size cutoffs.
/// Shared with the analysis engine so extracted market metrics land on the
/// same scale as the static baselines.
pub fn score_tam_billions(tam_billions: f64) -> f64 {
    if tam_billions > 1000.0 {
        75.0
    } else if tam_billions > 100.0 {
        65.0
    } else {
        45.0
    }
}

/// Score a market growth rate (percent per year) against the fixed cutoffs
pub fn score_growth_pct(growth_pct: f64) -> f64 {
    if growth_pct > 15.0 {
        80.0
    } else if growth_pct > 8.0 {
        65.0
    } else {
        45.0
    }
}

fn score_tam(baseline: &IndustryBaseline, warnings: &mut Vec<String>) -> (f64, String) {
    if baseline.tam_billions > 1000.0 {
        (
            75.0,
            format!(
                "{} is a large market (~${:.0}B TAM) with room for multiple outsized outcomes",
                baseline.industry, baseline.tam_billions
            ),
        )
    } else if baseline.tam_billions > 100.0 {
        (
            65.0,
            format!(
                "{} offers a substantial ~${:.0}B addressable market",
                baseline.industry, baseline.tam_billions
            ),
        )
    } else {
        warnings.push(format!(
            "Addressable market for {} is under $100B; sizing needs company-level validation",
            baseline.industry
        ));
        (
            45.0,
            format!("{} is a comparatively narrow market", baseline.industry),
        )
    }
}

fn score_growth(
    baseline: &IndustryBaseline,
    fund_type: FundType,
    warnings: &mut Vec<String>,
) -> (f64, String) {
    if baseline.growth_rate_pct > 15.0 {
        (
            80.0,
            format!(
                "{} grows at ~{:.0}% per year, a strong tailwind",
                baseline.industry, baseline.growth_rate_pct
            ),
        )
    } else if baseline.growth_rate_pct > 8.0 {
        (
            65.0,
            format!(
                "{} grows at a moderate ~{:.0}% per year",
                baseline.industry, baseline.growth_rate_pct
            ),
        )
    } else {
        let note = match fund_type {
            FundType::Vc => "below typical venture growth expectations",
            FundType::Pe => "value creation will depend on share gains or margin work",
        };
        warnings.push(format!(
            "Market growth for {} is ~{:.0}% per year; {}",
            baseline.industry, baseline.growth_rate_pct, note
        ));
        (
            45.0,
            format!("{} is a slow-growth market", baseline.industry),
        )
    }
}

fn score_competition(baseline: &IndustryBaseline, warnings: &mut Vec<String>) -> (f64, String) {
    match baseline.competitive_intensity {
        PressureLevel::Low => (
            70.0,
            format!("{} has comparatively light competitive pressure", baseline.industry),
        ),
        PressureLevel::Moderate => (
            60.0,
            format!("{} carries moderate competitive intensity", baseline.industry),
        ),
        PressureLevel::High => {
            warnings.push(format!(
                "{} is a highly competitive field; differentiation evidence is critical",
                baseline.industry
            ));
            (
                45.0,
                format!("{} is a crowded, highly competitive market", baseline.industry),
            )
        }
    }
}

fn score_regulation(baseline: &IndustryBaseline, warnings: &mut Vec<String>) -> (f64, String) {
    match baseline.regulatory_burden {
        PressureLevel::Low => (
            70.0,
            format!("{} faces a light regulatory burden", baseline.industry),
        ),
        PressureLevel::Moderate => (
            60.0,
            format!("{} carries a manageable regulatory burden", baseline.industry),
        ),
        PressureLevel::High => {
            warnings.push(format!(
                "{} is heavily regulated; compliance costs must be underwritten",
                baseline.industry
            ));
            (
                45.0,
                format!("{} operates under heavy regulation", baseline.industry),
            )
        }
    }
}

fn score_margins(baseline: &IndustryBaseline, warnings: &mut Vec<String>) -> (f64, String) {
    if baseline.gross_margin_pct > 70.0 {
        (
            75.0,
            format!(
                "Typical {} gross margins (~{:.0}%) support strong unit economics",
                baseline.industry, baseline.gross_margin_pct
            ),
        )
    } else if baseline.gross_margin_pct > 50.0 {
        (
            60.0,
            format!(
                "Typical {} gross margins are ~{:.0}%",
                baseline.industry, baseline.gross_margin_pct
            ),
        )
    } else {
        warnings.push(format!(
            "Structural gross margins in {} are ~{:.0}%; unit economics need scrutiny",
            baseline.industry, baseline.gross_margin_pct
        ));
        (
            45.0,
            format!("{} is a structurally thin-margin industry", baseline.industry),
        )
    }
}

fn build_baselines() -> Vec<IndustryBaseline> {
    fn entry(
        industry: &str,
        tam_billions: f64,
        growth_rate_pct: f64,
        competitive_intensity: PressureLevel,
        regulatory_burden: PressureLevel,
        gross_margin_pct: f64,
    ) -> IndustryBaseline {
        IndustryBaseline {
            industry: industry.to_string(),
            tam_billions,
            growth_rate_pct,
            competitive_intensity,
            regulatory_burden,
            gross_margin_pct,
        }
    }

    use PressureLevel::{High, Low, Moderate};
    vec![
        entry("Financial Services", 1500.0, 9.0, High, High, 65.0),
        entry("Healthcare", 4000.0, 11.0, Moderate, High, 55.0),
        entry("Enterprise Software", 800.0, 14.0, High, Low, 75.0),
        entry("Consumer Internet", 600.0, 10.0, High, Moderate, 60.0),
        entry("E-Commerce & Retail", 5000.0, 12.0, High, Low, 35.0),
        entry("Cybersecurity", 220.0, 16.0, Moderate, Moderate, 78.0),
        entry("Artificial Intelligence", 500.0, 28.0, High, Moderate, 70.0),
        entry("Climate & Energy", 1300.0, 17.0, Moderate, High, 40.0),
        entry("Logistics & Supply Chain", 2300.0, 8.5, Moderate, Low, 30.0),
        entry("Real Estate & Construction", 3800.0, 6.0, Moderate, Moderate, 45.0),
        entry("Education", 350.0, 9.0, Moderate, Moderate, 65.0),
        entry("Industrial & Manufacturing", 2500.0, 5.0, Moderate, Moderate, 38.0),
    ]
}
