//! Enrichment pack types
//!
//! One pack covers one evaluation category's worth of external research.
//! Pack output is a tagged `PackData` per kind, so downstream consumers get
//! typed fields rather than an untyped blob; the `Raw` variant carries
//! whatever text survived when extraction had nothing better.

use dealdesk_common::criteria::{Category, CriteriaTemplate, FundType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder shown when a pattern produced nothing; consumers always see
/// a value, never an absent field
pub const NOT_AVAILABLE: &str = "not available";
/// Placeholder for fields the research pass has not reached yet
pub const ANALYSIS_PENDING: &str = "analysis pending";

/// Which extraction schema a pack's research text feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackKind {
    Market,
    Financial,
    Competitive,
    Team,
    General,
}

impl PackKind {
    /// Choose a kind from the category name the pack covers
    pub fn for_category(category_name: &str) -> Self {
        let name = category_name.to_lowercase();
        if name.contains("market") {
            PackKind::Market
        } else if name.contains("financial") || name.contains("deal structure") {
            PackKind::Financial
        } else if name.contains("competitive") || name.contains("product") {
            PackKind::Competitive
        } else if name.contains("team") || name.contains("management") || name.contains("leadership")
        {
            PackKind::Team
        } else {
            PackKind::General
        }
    }
}

/// One planned enrichment pack, derived from a template category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackPlan {
    /// Pack name, e.g. `vc_market_opportunity`
    pub name: String,
    /// Category this pack covers
    pub category: String,
    pub kind: PackKind,
    /// Keywords steering the research prompt, collected from the category's
    /// enabled subcategories
    pub keywords: Vec<String>,
}

impl PackPlan {
    /// Build one plan per enabled category of a template
    pub fn for_template(template: &CriteriaTemplate) -> Vec<PackPlan> {
        template
            .enabled_categories()
            .map(|c| Self::for_category_of(template.fund_type, c))
            .collect()
    }

    fn for_category_of(fund_type: FundType, category: &Category) -> PackPlan {
        let keywords = category
            .enabled_subcategories()
            .flat_map(|s| s.ai_search_keywords.iter().cloned())
            .collect();
        PackPlan {
            name: pack_name(fund_type, &category.name),
            category: category.name.clone(),
            kind: PackKind::for_category(&category.name),
            keywords,
        }
    }
}

/// Canonical pack name: fund type prefix + snake-cased category name
pub fn pack_name(fund_type: FundType, category_name: &str) -> String {
    let slug: String = category_name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    // Collapse runs of underscores from punctuation like "&"
    let mut collapsed = String::with_capacity(slug.len());
    for c in slug.chars() {
        if c == '_' && collapsed.ends_with('_') {
            continue;
        }
        collapsed.push(c);
    }
    format!("{}_{}", fund_type.as_str(), collapsed.trim_matches('_'))
}

/// One value pulled out of research prose. `text` is always populated — with
/// a formatted value or a placeholder — so there is never an absent field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractedMetric {
    /// Display value or placeholder ("not available" / "analysis pending")
    pub text: String,
    /// Parsed numeric value when the pattern yielded one
    pub value: Option<f64>,
    /// The matched span of source text, empty when nothing matched
    pub raw_text: String,
}

impl ExtractedMetric {
    pub fn missing(placeholder: &str) -> Self {
        Self { text: placeholder.to_string(), value: None, raw_text: String::new() }
    }

    pub fn found(text: String, value: Option<f64>, raw_text: String) -> Self {
        Self { text, value, raw_text }
    }

    pub fn is_found(&self) -> bool {
        !self.raw_text.is_empty()
    }
}

/// Market-pack metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketMetrics {
    /// Total addressable market, USD billions when parsed
    pub tam: ExtractedMetric,
    /// Serviceable addressable market, USD billions when parsed
    pub sam: ExtractedMetric,
    /// Growth rate, percent per year when parsed
    pub growth_rate: ExtractedMetric,
}

/// Financial-pack metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialMetrics {
    /// Total capital raised, USD millions when parsed
    pub total_raised: ExtractedMetric,
    /// Annual revenue, USD millions when parsed
    pub revenue: ExtractedMetric,
    /// Monthly burn, USD millions when parsed
    pub burn_rate: ExtractedMetric,
}

/// Competitive-pack data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitiveData {
    /// Competitor names pulled from listings in the text
    pub competitors: Vec<String>,
    /// Positioning summary sentence when one was found
    pub positioning: ExtractedMetric,
}

/// Team-pack data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamAssessment {
    /// Founder/leadership summary sentence when one was found
    pub leadership: ExtractedMetric,
    /// Team headcount when stated
    pub team_size: ExtractedMetric,
}

/// Tagged per-kind pack payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PackData {
    Market(MarketMetrics),
    Financial(FinancialMetrics),
    Competitive(CompetitiveData),
    Team(TeamAssessment),
    /// Fallback carrying unstructured text: degraded packs and kinds with no
    /// extraction schema
    Raw { text: String },
}

impl PackData {
    /// True when the payload is a degraded/unstructured fallback
    pub fn is_raw(&self) -> bool {
        matches!(self, PackData::Raw { .. })
    }
}

/// Output of one pack run, upserted keyed by (deal, pack name)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub deal_id: Uuid,
    pub pack_name: String,
    pub data: PackData,
    /// Citation URLs, or a fallback marker for degraded packs
    pub sources: Vec<String>,
    /// 0-100; degraded packs are forced to 20-25
    pub confidence: f64,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

impl EnrichmentResult {
    /// Degraded packs carry fallback sources instead of citations
    pub fn is_degraded(&self) -> bool {
        self.sources.iter().any(|s| s == "fallback" || s == "error-fallback")
    }
}
