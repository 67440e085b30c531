//! Investment criteria data model
//!
//! A `CriteriaTemplate` is the per-fund configuration tree: categories with
//! percentage weights, each holding weighted subcategories that carry the
//! human-readable evaluation heuristics and the keywords used to steer
//! external research prompts. Templates are persisted as an opaque JSON
//! document per fund and edited freely by the UI; the validator is the only
//! gate on their internal consistency.

mod scoring;
mod templates;
mod validate;

pub use scoring::{
    average_confidence, weighted_category_score, RagStatus, ScoreBand, WeightedEvidence,
    NEUTRAL_SCORE,
};
pub use templates::{default_target_parameters, default_template};
pub use validate::{ValidationReport, WeightValidator};

use serde::{Deserialize, Serialize};

/// Fund type selecting which criteria template applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FundType {
    /// Venture capital
    Vc,
    /// Private equity
    Pe,
}

impl FundType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FundType::Vc => "vc",
            FundType::Pe => "pe",
        }
    }
}

impl std::str::FromStr for FundType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vc" => Ok(FundType::Vc),
            "pe" => Ok(FundType::Pe),
            other => Err(format!("Unknown fund type: {}", other)),
        }
    }
}

/// Root configuration for one fund type. Nominal total weight is 100,
/// enforced by [`WeightValidator`] over the enabled categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriteriaTemplate {
    pub fund_type: FundType,
    pub categories: Vec<Category>,
}

impl CriteriaTemplate {
    /// Iterate enabled categories only
    pub fn enabled_categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|c| c.enabled)
    }
}

/// Named grouping of subcategories (e.g. "Market Opportunity")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    /// Percentage of the template total (0-100)
    pub weight: f64,
    pub enabled: bool,
    pub subcategories: Vec<Subcategory>,
}

impl Category {
    /// Iterate enabled subcategories only
    pub fn enabled_subcategories(&self) -> impl Iterator<Item = &Subcategory> {
        self.subcategories.iter().filter(|s| s.enabled)
    }
}

/// Named evaluation unit inside a category (e.g. "Founder Experience")
///
/// Signals are human-readable heuristics for reviewers, not executable
/// rules; `ai_search_keywords` steer the external research prompts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subcategory {
    pub name: String,
    /// Percentage within the parent's enabled subcategories (0-100)
    pub weight: f64,
    pub enabled: bool,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub positive_signals: Vec<String>,
    #[serde(default)]
    pub negative_signals: Vec<String>,
    #[serde(default)]
    pub ai_search_keywords: Vec<String>,
    /// True for user-authored subcategories, false for template-provided
    #[serde(default)]
    pub custom: bool,
}

/// Type of a flat target-allocation parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    Sector,
    Stage,
    Geography,
}

impl ParameterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::Sector => "sector",
            ParameterType::Stage => "stage",
            ParameterType::Geography => "geography",
        }
    }
}

/// Flat weighted item for the secondary allocation view.
/// Enabled siblings of the same `param_type` must sum to 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetParameter {
    pub name: String,
    pub param_type: ParameterType,
    pub weight: f64,
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fund_type_round_trips_through_serde() {
        let json = serde_json::to_string(&FundType::Vc).unwrap();
        assert_eq!(json, "\"vc\"");
        let parsed: FundType = serde_json::from_str("\"pe\"").unwrap();
        assert_eq!(parsed, FundType::Pe);
    }

    #[test]
    fn fund_type_parses_case_insensitive() {
        assert_eq!("VC".parse::<FundType>().unwrap(), FundType::Vc);
        assert_eq!(" pe ".parse::<FundType>().unwrap(), FundType::Pe);
        assert!("hedge".parse::<FundType>().is_err());
    }

    #[test]
    fn template_survives_json_round_trip() {
        let template = default_template(FundType::Vc);
        let json = serde_json::to_string(&template).unwrap();
        let back: CriteriaTemplate = serde_json::from_str(&json).unwrap();
        assert_eq!(back.categories.len(), template.categories.len());
        assert_eq!(back.categories[0].name, template.categories[0].name);
    }

    #[test]
    fn subcategory_defaults_fill_missing_fields() {
        let json = r#"{"name":"Custom Check","weight":10.0,"enabled":true}"#;
        let sub: Subcategory = serde_json::from_str(json).unwrap();
        assert!(sub.requirements.is_empty());
        assert!(sub.positive_signals.is_empty());
        assert!(!sub.custom);
    }
}
