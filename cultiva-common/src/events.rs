//! Event types for the Cultiva event system
//!
//! Provides shared event definitions and EventBus for all Cultiva services.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Cultiva event types
///
/// Events are broadcast via EventBus; every variant carries its own
/// timestamp so consumers can order events without inspecting the channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CultivaEvent {
    /// A new analytics record was computed and persisted for a plant
    AnalyticsComputed {
        plant_id: Uuid,
        yield_prediction_g: f64,
        growth_rate_cm_day: f64,
        overall_efficiency: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Recommendations were generated (fresh compute, not a cache hit)
    RecommendationsGenerated {
        plant_id: Uuid,
        total: usize,
        confidence: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Feedback was recorded against a recommendation
    FeedbackRecorded {
        recommendation_id: Uuid,
        plant_id: Uuid,
        implemented: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A scheduled batch analytics cycle finished
    SchedulerCycleCompleted {
        processed: usize,
        skipped: usize,
        errors: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The daily retention sweep finished
    RetentionSweepCompleted {
        expired_deleted: u64,
        orphans_deleted: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Hourly health probe result
    HealthProbe {
        database_ok: bool,
        stale_plants: i64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

// ============================================================================
// EventBus Implementation
// ============================================================================

/// Broadcast bus for CultivaEvent.
///
/// Uses tokio::broadcast internally, providing:
/// - Multiple subscribers, each with an independent cursor
/// - Bounded buffering (old events dropped when the channel is full)
/// - Cheap cloning (the bus itself is a sender handle)
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CultivaEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Returns a receiver that will receive all events emitted after
    /// subscription. Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<CultivaEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: CultivaEvent,
    ) -> std::result::Result<usize, broadcast::error::SendError<CultivaEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// Useful for non-critical events where it's acceptable if no component
    /// is currently listening.
    pub fn emit_lossy(&self, event: CultivaEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
