//! Settings and ops switch API handlers

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::AppState;

/// GET /switches response entry
#[derive(Debug, Serialize)]
pub struct SwitchEntry {
    pub name: String,
    pub enabled: bool,
}

/// POST /switches request
#[derive(Debug, Deserialize)]
pub struct SetSwitchRequest {
    pub name: String,
    pub enabled: bool,
}

/// POST /settings request; only supplied fields are updated
#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub openai_api_key: Option<String>,
    pub perplexity_api_key: Option<String>,
}

/// GET /switches
pub async fn list_switches(State(state): State<AppState>) -> ApiResult<Json<Vec<SwitchEntry>>> {
    let switches = crate::db::switches::list_switches(&state.db).await?;
    Ok(Json(
        switches
            .into_iter()
            .map(|(name, enabled)| SwitchEntry { name, enabled })
            .collect(),
    ))
}

/// POST /switches
pub async fn set_switch(
    State(state): State<AppState>,
    Json(request): Json<SetSwitchRequest>,
) -> ApiResult<Json<SwitchEntry>> {
    crate::db::switches::set_switch(&state.db, &request.name, request.enabled).await?;
    tracing::info!(switch = %request.name, enabled = request.enabled, "Ops switch updated");
    Ok(Json(SwitchEntry { name: request.name, enabled: request.enabled }))
}

/// POST /settings
///
/// Stores API keys in the database tier, which outranks environment and
/// TOML at the next startup's key resolution.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(request): Json<UpdateSettingsRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    if let Some(key) = request.openai_api_key {
        crate::db::settings::set_openai_api_key(&state.db, key).await?;
    }
    if let Some(key) = request.perplexity_api_key {
        crate::db::settings::set_perplexity_api_key(&state.db, key).await?;
    }
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Build settings routes
pub fn settings_routes() -> Router<AppState> {
    Router::new()
        .route("/switches", get(list_switches))
        .route("/switches", post(set_switch))
        .route("/settings", post(update_settings))
}
