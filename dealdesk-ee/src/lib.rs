//! dealdesk-ee library interface
//!
//! Exposes public APIs for integration testing

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

use dealdesk_common::events::EventBus;
use services::{
    AnalysisEngine, BaselineCatalog, EnrichmentOrchestrator, IndustryCatalog, ProviderSet,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Analysis engine over the immutable reference catalogs
    pub engine: Arc<AnalysisEngine>,
    /// Enrichment orchestrator bound to the configured providers
    pub orchestrator: Arc<EnrichmentOrchestrator>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    /// Assemble state from a pool, bus, and provider set. Reference catalogs
    /// are built once here and shared by reference from then on.
    pub fn new(db: SqlitePool, event_bus: EventBus, providers: ProviderSet) -> Self {
        let engine = Arc::new(AnalysisEngine::new(
            Arc::new(IndustryCatalog::builtin()),
            Arc::new(BaselineCatalog::builtin()),
        ));
        let orchestrator = Arc::new(EnrichmentOrchestrator::new(
            db.clone(),
            event_bus.clone(),
            providers,
            Arc::clone(&engine),
        ));
        Self {
            db,
            event_bus,
            engine,
            orchestrator,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
///
/// CORS is fully open: the dashboard is served from a different origin and
/// the service carries no cookie-based auth.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::enrich_routes())
        .merge(api::analysis_routes())
        .merge(api::criteria_routes())
        .merge(api::settings_routes())
        .merge(api::health_routes())
        .route("/events", get(api::event_stream))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
