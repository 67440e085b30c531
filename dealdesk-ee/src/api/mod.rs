//! HTTP API handlers for dealdesk-ee

pub mod analysis;
pub mod criteria;
pub mod enrich;
pub mod health;
pub mod settings;
pub mod sse;

pub use analysis::analysis_routes;
pub use criteria::criteria_routes;
pub use enrich::enrich_routes;
pub use health::health_routes;
pub use settings::settings_routes;
pub use sse::event_stream;
