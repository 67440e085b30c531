//! Analysis and IC memo API handlers

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::analysis::{AnalysisResult, IcMemo};
use crate::AppState;

/// POST /deals/{deal_id}/analyze
///
/// Recompute scores from stored enrichment plus industry baselines, persist
/// the analysis and a fresh memo version, and return the analysis.
pub async fn analyze_deal(
    State(state): State<AppState>,
    Path(deal_id): Path<Uuid>,
) -> ApiResult<Json<AnalysisResult>> {
    let analysis = state
        .engine
        .recompute_and_store(&state.db, &state.event_bus, deal_id)
        .await?;

    crate::db::activity::record_activity(&state.db, Some(deal_id), None, "analysis_run", "")
        .await?;

    Ok(Json(analysis))
}

/// GET /deals/{deal_id}/analysis
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(deal_id): Path<Uuid>,
) -> ApiResult<Json<AnalysisResult>> {
    let analysis = crate::db::analysis::load_analysis(&state.db, deal_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No analysis stored for deal {}", deal_id)))?;
    Ok(Json(analysis))
}

/// GET /deals/{deal_id}/memo
pub async fn get_memo(
    State(state): State<AppState>,
    Path(deal_id): Path<Uuid>,
) -> ApiResult<Json<IcMemo>> {
    let memo = crate::db::analysis::load_memo(&state.db, deal_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No memo stored for deal {}", deal_id)))?;
    Ok(Json(memo))
}

/// Build analysis routes
pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/deals/:deal_id/analyze", post(analyze_deal))
        .route("/deals/:deal_id/analysis", get(get_analysis))
        .route("/deals/:deal_id/memo", get(get_memo))
}
