//! Aggregated analysis output types

use dealdesk_common::criteria::{RagStatus, ScoreBand};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One subcategory's evidence as it entered the weighted combination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubcategoryScore {
    pub name: String,
    pub weight: f64,
    pub score: f64,
    pub confidence: f64,
    /// Evidence justification; empty when only the neutral default applied
    pub reasoning: String,
    pub warnings: Vec<String>,
}

/// One category's combined score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryScore {
    pub name: String,
    pub weight: f64,
    pub score: f64,
    pub band: ScoreBand,
    /// Unweighted mean of subcategory confidences
    pub average_confidence: f64,
    pub subcategories: Vec<SubcategoryScore>,
}

/// Aggregated per-deal scored output, versioned on each recomputation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub deal_id: Uuid,
    pub category_scores: Vec<CategoryScore>,
    pub overall_score: f64,
    pub overall_band: ScoreBand,
    pub rag_status: RagStatus,
    /// Unweighted mean over all scored subcategories
    pub average_confidence: f64,
    /// Canonical industry the deal resolved to, when the classifier matched
    pub resolved_industry: Option<String>,
    /// Narrative paragraphs keyed by section name
    pub narrative: Vec<NarrativeSection>,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeSection {
    pub title: String,
    pub body: String,
}

/// Investment-committee memo assembled from an analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IcMemo {
    pub deal_id: Uuid,
    pub summary: String,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
    /// Deal/fund industry alignment note
    pub alignment: String,
    pub overall_score: f64,
    pub rag_status: RagStatus,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
