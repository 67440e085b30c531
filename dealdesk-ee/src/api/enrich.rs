//! Enrichment API handlers
//!
//! POST /enrich runs the packs synchronously and returns 200 with healthy
//! and degraded results mixed; only a missing deal/fund or a thrown ops
//! switch aborts the request.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::switches::{is_switch_enabled, ENRICHMENT_SWITCH};
use crate::error::{ApiError, ApiResult};
use crate::models::enrichment::EnrichmentResult;
use crate::services::analysis_engine::plan_packs;
use crate::AppState;

/// POST /enrich request
#[derive(Debug, Deserialize)]
pub struct EnrichRequest {
    pub deal_id: Uuid,
    pub fund_id: Uuid,
    /// Pack names to run; omitted or empty means every enabled category
    #[serde(default)]
    pub enrichment_packs: Option<Vec<String>>,
    #[serde(default)]
    pub force_refresh: bool,
}

/// POST /enrich response
#[derive(Debug, Serialize)]
pub struct EnrichResponse {
    pub success: bool,
    pub deal_id: Uuid,
    pub results: Vec<EnrichmentResult>,
}

/// POST /enrich
pub async fn run_enrichment(
    State(state): State<AppState>,
    Json(request): Json<EnrichRequest>,
) -> ApiResult<Json<EnrichResponse>> {
    if !is_switch_enabled(&state.db, ENRICHMENT_SWITCH).await? {
        return Err(ApiError::Conflict(
            "Enrichment is disabled by the ops control switch".to_string(),
        ));
    }

    let deal = crate::db::deals::get_deal(&state.db, request.deal_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Deal not found: {}", request.deal_id)))?;
    let fund = crate::db::deals::get_fund(&state.db, request.fund_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Fund not found: {}", request.fund_id)))?;
    if deal.fund_id != fund.id {
        return Err(ApiError::BadRequest(format!(
            "Deal {} does not belong to fund {}",
            deal.id, fund.id
        )));
    }

    let template = match crate::db::strategies::load_strategy(&state.db, fund.id).await? {
        Some((template, _)) => template,
        None => dealdesk_common::criteria::default_template(fund.fund_type),
    };

    let plans = plan_packs(&template, request.enrichment_packs.as_deref());
    if plans.is_empty() {
        return Err(ApiError::BadRequest(
            "No enrichment packs match the request".to_string(),
        ));
    }

    tracing::info!(
        deal_id = %deal.id,
        fund_id = %fund.id,
        packs = plans.len(),
        force_refresh = request.force_refresh,
        "Enrichment requested"
    );

    let results = state.orchestrator.run(&deal, plans, request.force_refresh).await?;

    crate::db::activity::record_activity(
        &state.db,
        Some(deal.id),
        Some(fund.id),
        "enrichment_run",
        &format!("{} packs", results.len()),
    )
    .await?;

    Ok(Json(EnrichResponse { success: true, deal_id: deal.id, results }))
}

/// Build enrichment routes
pub fn enrich_routes() -> Router<AppState> {
    Router::new().route("/enrich", post(run_enrichment))
}
