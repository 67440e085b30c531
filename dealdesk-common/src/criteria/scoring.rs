//! Weighted score combination and status banding
//!
//! The scorer only knows how to weight and combine evidence scores supplied
//! by an external source (enrichment results or industry baselines); it
//! never produces evidence itself. Scores are combined weight-proportionally,
//! confidences as a plain unweighted mean — that asymmetry is deliberate:
//! confidence measures how much evidence backs a subcategory, which does not
//! scale with the subcategory's importance to the thesis.

use serde::{Deserialize, Serialize};

/// Neutral fallback score used whenever there is nothing to weigh
pub const NEUTRAL_SCORE: f64 = 50.0;

/// One enabled subcategory's weight and evidence, ready for combination
#[derive(Debug, Clone, Copy)]
pub struct WeightedEvidence {
    /// Subcategory weight within its category (0-100)
    pub weight: f64,
    /// Evidence score (0-100)
    pub score: f64,
    /// Evidence confidence (0-100)
    pub confidence: f64,
}

/// Weight-proportional category score over enabled subcategories.
/// Total weight 0 yields the neutral 50.
pub fn weighted_category_score(items: &[WeightedEvidence]) -> f64 {
    let total_weight: f64 = items.iter().map(|i| i.weight).sum();
    if total_weight <= 0.0 {
        return NEUTRAL_SCORE;
    }
    items.iter().map(|i| i.score * i.weight).sum::<f64>() / total_weight
}

/// Unweighted arithmetic mean of subcategory confidences.
/// No items yields the neutral 50.
pub fn average_confidence(items: &[WeightedEvidence]) -> f64 {
    if items.is_empty() {
        return NEUTRAL_SCORE;
    }
    items.iter().map(|i| i.confidence).sum::<f64>() / items.len() as f64
}

/// Status band for a 0-100 score. Threshold constants are fixed and must not
/// drift: downstream dashboards and stored analyses depend on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    Moderate,
    NeedsImprovement,
    Concerning,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ScoreBand::Excellent
        } else if score >= 70.0 {
            ScoreBand::Good
        } else if score >= 60.0 {
            ScoreBand::Moderate
        } else if score >= 50.0 {
            ScoreBand::NeedsImprovement
        } else {
            ScoreBand::Concerning
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "excellent",
            ScoreBand::Good => "good",
            ScoreBand::Moderate => "moderate",
            ScoreBand::NeedsImprovement => "needs_improvement",
            ScoreBand::Concerning => "concerning",
        }
    }
}

/// Red/Amber/Green health indicator derived from the overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RagStatus {
    Green,
    Amber,
    Red,
}

impl RagStatus {
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            RagStatus::Green
        } else if score >= 50.0 {
            RagStatus::Amber
        } else {
            RagStatus::Red
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RagStatus::Green => "green",
            RagStatus::Amber => "amber",
            RagStatus::Red => "red",
        }
    }
}
