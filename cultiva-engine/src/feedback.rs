//! Recommendation feedback
//!
//! Validates feedback submissions, maintains the one-row-per-recommendation
//! history, and invalidates the plant's recommendation cache so the next
//! read reflects the new information.

use cultiva_common::events::{CultivaEvent, EventBus};
use cultiva_common::{time, Error, Result};
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::db;
use crate::models::{FeedbackStats, FeedbackSubmission, Recommendation, RecommendationHistoryEntry};
use crate::recommend::RecommendationCache;

/// Records feedback and keeps the recommendation history
#[derive(Clone)]
pub struct FeedbackService {
    db: SqlitePool,
    cache: Arc<RecommendationCache>,
    event_bus: EventBus,
}

impl FeedbackService {
    pub fn new(db: SqlitePool, cache: Arc<RecommendationCache>, event_bus: EventBus) -> Self {
        Self {
            db,
            cache,
            event_bus,
        }
    }

    /// Record feedback for a recommendation.
    ///
    /// The caller passes the recommendation being rated; its snapshot is
    /// stored on first feedback and survives later updates. An implemented
    /// recommendation without an effectiveness rating is a validation
    /// error and nothing is persisted.
    pub async fn submit(
        &self,
        plant_id: Uuid,
        recommendation: &Recommendation,
        submission: FeedbackSubmission,
    ) -> Result<RecommendationHistoryEntry> {
        if submission.implemented && submission.effectiveness.is_none() {
            return Err(Error::validation([
                "effectiveness is required when implemented is true",
            ]));
        }

        let now = time::now();
        let existing = db::feedback::get_entry(&self.db, recommendation.id).await?;

        let entry = match existing {
            // Later feedback updates the row but keeps snapshot + created_at
            Some(previous) => RecommendationHistoryEntry {
                implemented: submission.implemented,
                effectiveness: submission.effectiveness,
                notes: submission.notes,
                outcome: submission.outcome,
                updated_at: now,
                ..previous
            },
            None => RecommendationHistoryEntry {
                recommendation_id: recommendation.id,
                plant_id,
                recommendation: recommendation.clone(),
                implemented: submission.implemented,
                effectiveness: submission.effectiveness,
                notes: submission.notes,
                outcome: submission.outcome,
                created_at: now,
                updated_at: now,
            },
        };

        db::feedback::upsert_entry(&self.db, &entry).await?;

        // Feedback changes what the next generation should say
        let removed = self.cache.clear_plant(plant_id);
        tracing::info!(
            recommendation_id = %recommendation.id,
            plant_id = %plant_id,
            implemented = entry.implemented,
            cache_entries_cleared = removed,
            "Feedback recorded"
        );

        self.event_bus.emit_lossy(CultivaEvent::FeedbackRecorded {
            recommendation_id: recommendation.id,
            plant_id,
            implemented: entry.implemented,
            timestamp: now,
        });

        Ok(entry)
    }

    /// Recommendation history for a plant, newest first
    pub async fn history(&self, plant_id: Uuid) -> Result<Vec<RecommendationHistoryEntry>> {
        db::feedback::list_for_plant(&self.db, plant_id).await
    }

    /// One history entry by recommendation id
    pub async fn get(&self, recommendation_id: Uuid) -> Result<RecommendationHistoryEntry> {
        db::feedback::get_entry(&self.db, recommendation_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("recommendation {}", recommendation_id)))
    }

    /// Aggregated feedback statistics for a plant
    pub async fn stats(&self, plant_id: Uuid) -> Result<FeedbackStats> {
        db::feedback::stats(&self.db, plant_id).await
    }
}
