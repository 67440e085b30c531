//! Criteria template API handlers
//!
//! Validation reports are plain values: a template that fails the weight
//! check still gets a 200, with `is_valid: false` and the messages intended
//! for inline UI display. Saving is gated on a clean report.

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use dealdesk_common::criteria::{
    default_target_parameters, default_template, CriteriaTemplate, FundType, TargetParameter,
    ValidationReport, WeightValidator,
};
use dealdesk_common::events::DealEvent;

/// GET /criteria/defaults/{fund_type} response
#[derive(Debug, Serialize)]
pub struct DefaultsResponse {
    pub template: CriteriaTemplate,
    pub target_parameters: Vec<TargetParameter>,
}

/// POST /criteria/validate request
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub template: CriteriaTemplate,
    #[serde(default)]
    pub target_parameters: Vec<TargetParameter>,
}

/// PUT /funds/{fund_id}/criteria request
#[derive(Debug, Deserialize)]
pub struct SaveCriteriaRequest {
    pub template: CriteriaTemplate,
    #[serde(default)]
    pub target_parameters: Vec<TargetParameter>,
}

/// PUT /funds/{fund_id}/criteria response
#[derive(Debug, Serialize)]
pub struct SaveCriteriaResponse {
    pub saved: bool,
    pub report: ValidationReport,
}

/// GET /criteria/defaults/{fund_type}
pub async fn get_defaults(Path(fund_type): Path<String>) -> ApiResult<Json<DefaultsResponse>> {
    let fund_type: FundType = fund_type.parse().map_err(ApiError::BadRequest)?;
    Ok(Json(DefaultsResponse {
        template: default_template(fund_type),
        target_parameters: default_target_parameters(fund_type),
    }))
}

/// POST /criteria/validate
pub async fn validate_criteria(
    Json(request): Json<ValidateRequest>,
) -> ApiResult<Json<ValidationReport>> {
    Ok(Json(run_validation(&request.template, &request.target_parameters)))
}

/// GET /funds/{fund_id}/criteria
///
/// Returns the saved strategy, or the fund type's defaults when the fund has
/// never saved one.
pub async fn get_fund_criteria(
    State(state): State<AppState>,
    Path(fund_id): Path<Uuid>,
) -> ApiResult<Json<DefaultsResponse>> {
    let fund = crate::db::deals::get_fund(&state.db, fund_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Fund not found: {}", fund_id)))?;

    let (template, target_parameters) =
        match crate::db::strategies::load_strategy(&state.db, fund_id).await? {
            Some(saved) => saved,
            None => (default_template(fund.fund_type), default_target_parameters(fund.fund_type)),
        };

    Ok(Json(DefaultsResponse { template, target_parameters }))
}

/// PUT /funds/{fund_id}/criteria
pub async fn save_fund_criteria(
    State(state): State<AppState>,
    Path(fund_id): Path<Uuid>,
    Json(request): Json<SaveCriteriaRequest>,
) -> ApiResult<Json<SaveCriteriaResponse>> {
    crate::db::deals::get_fund(&state.db, fund_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Fund not found: {}", fund_id)))?;

    let report = run_validation(&request.template, &request.target_parameters);
    if !report.is_valid {
        tracing::info!(fund_id = %fund_id, errors = report.errors.len(), "Criteria save rejected by validation");
        return Ok(Json(SaveCriteriaResponse { saved: false, report }));
    }

    crate::db::strategies::save_strategy(
        &state.db,
        fund_id,
        &request.template,
        &request.target_parameters,
    )
    .await?;

    crate::db::activity::record_activity(&state.db, None, Some(fund_id), "criteria_saved", "")
        .await?;
    state.event_bus.emit(DealEvent::CriteriaSaved {
        fund_id,
        timestamp: chrono::Utc::now(),
    });

    Ok(Json(SaveCriteriaResponse { saved: true, report }))
}

fn run_validation(
    template: &CriteriaTemplate,
    target_parameters: &[TargetParameter],
) -> ValidationReport {
    let validator = WeightValidator::default();
    let mut report = validator.validate_template(template);
    let params_report = validator.validate_target_parameters(target_parameters);
    report.is_valid = report.is_valid && params_report.is_valid;
    report.errors.extend(params_report.errors);
    report
}

/// Build criteria routes
pub fn criteria_routes() -> Router<AppState> {
    Router::new()
        .route("/criteria/defaults/:fund_type", get(get_defaults))
        .route("/criteria/validate", post(validate_criteria))
        .route("/funds/:fund_id/criteria", get(get_fund_criteria))
        .route("/funds/:fund_id/criteria", put(save_fund_criteria))
}
