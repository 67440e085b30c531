//! Data models for the evaluation engine

pub mod analysis;
pub mod enrichment;

pub use analysis::{AnalysisResult, CategoryScore, IcMemo, SubcategoryScore};
pub use enrichment::{
    CompetitiveData, EnrichmentResult, ExtractedMetric, FinancialMetrics, MarketMetrics,
    PackData, PackKind, PackPlan, TeamAssessment,
};
