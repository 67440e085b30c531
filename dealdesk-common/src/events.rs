//! Event types for the DealDesk event system
//!
//! Provides shared event definitions and the EventBus used for SSE
//! transmission to connected dashboards.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// DealDesk event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
/// All events use this central enum for type safety and exhaustive matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DealEvent {
    /// Enrichment run started for a deal
    EnrichmentStarted {
        deal_id: Uuid,
        /// Pack names queued for this run
        packs: Vec<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// One enrichment pack finished (healthy or degraded)
    PackCompleted {
        deal_id: Uuid,
        pack_name: String,
        /// Result confidence (0-100); degraded packs report 20-25
        confidence: f64,
        /// True when the pack fell back after a timeout or provider error
        degraded: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// All packs of an enrichment run finished
    EnrichmentCompleted {
        deal_id: Uuid,
        packs_total: usize,
        packs_degraded: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Analysis scores were recomputed and persisted
    AnalysisUpdated {
        deal_id: Uuid,
        overall_score: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A fund's criteria template was saved
    CriteriaSaved {
        fund_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl DealEvent {
    /// SSE event name for this variant
    pub fn event_type(&self) -> &'static str {
        match self {
            DealEvent::EnrichmentStarted { .. } => "enrichment_started",
            DealEvent::PackCompleted { .. } => "pack_completed",
            DealEvent::EnrichmentCompleted { .. } => "enrichment_completed",
            DealEvent::AnalysisUpdated { .. } => "analysis_updated",
            DealEvent::CriteriaSaved { .. } => "criteria_saved",
        }
    }
}

/// Broadcast event bus shared by handlers and the orchestrator
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DealEvent>,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity.
    /// Old events are dropped once the buffer is full.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events. Events emitted before subscription
    /// are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<DealEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers. A send error only means there are
    /// no subscribers, which is not a failure.
    pub fn emit(&self, event: DealEvent) {
        let _ = self.tx.send(event);
    }
}
