//! Recommendation Engine
//!
//! Runs the rule set over a plant's current state, filters by confidence,
//! prioritizes, and caches the result keyed by (plant, options) with a
//! time-to-live.

pub mod cache;
pub mod rules;

use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use cultiva_common::events::{CultivaEvent, EventBus};
use cultiva_common::{time, Result};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use uuid::Uuid;

pub use cache::RecommendationCache;
pub use rules::{evaluate_all, RuleContext, RULES};

use crate::db;
use crate::metrics::classify_strain;
use crate::models::RecommendationSet;

/// Historical analytics rows loaded when `include_historical` is set
const HISTORY_LIMIT: i64 = 30;

/// Default confidence threshold for surfaced recommendations
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Options for one `generate` call
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub include_historical: bool,
    pub confidence_threshold: f64,
    pub force_refresh: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            include_historical: false,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            force_refresh: false,
        }
    }
}

/// Generates prioritized, confidence-scored recommendations
#[derive(Clone)]
pub struct RecommendationEngine {
    db: SqlitePool,
    cache: Arc<RecommendationCache>,
    event_bus: EventBus,
    rule_runs: Arc<AtomicU64>,
}

impl RecommendationEngine {
    /// The cache is injected so ownership is explicit and shared with the
    /// feedback path, which invalidates it on submission.
    pub fn new(db: SqlitePool, cache: Arc<RecommendationCache>, event_bus: EventBus) -> Self {
        Self {
            db,
            cache,
            event_bus,
            rule_runs: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of full rule-set evaluations performed so far. Cache hits do
    /// not increment this.
    pub fn rule_evaluations(&self) -> u64 {
        self.rule_runs.load(AtomicOrdering::Relaxed)
    }

    /// Generate (or fetch from cache) the recommendation set for a plant.
    ///
    /// Every surfaced recommendation has confidence ≥ the requested
    /// threshold; the list is stable-sorted by priority weight × confidence
    /// descending; the set confidence is the unweighted mean of the
    /// surfaced confidences.
    pub async fn generate(
        &self,
        plant_id: Uuid,
        options: GenerateOptions,
    ) -> Result<RecommendationSet> {
        let key = cache_key(plant_id, &options);

        if !options.force_refresh {
            if let Some(cached) = self.cache.get(&key) {
                tracing::debug!(plant_id = %plant_id, "Recommendation cache hit");
                return Ok(cached);
            }
        }

        let plant = db::plants::get_plant(&self.db, plant_id).await?;
        let analytics = db::analytics::latest_for_plant(&self.db, plant_id).await?;
        let latest_sample = db::samples::latest_for_tent(&self.db, &plant.tent_id).await?;
        let history = if options.include_historical {
            db::analytics::list_for_plant(&self.db, plant_id, HISTORY_LIMIT).await?
        } else {
            Vec::new()
        };

        let now = time::now();
        let ctx = RuleContext {
            plant: &plant,
            strain_class: classify_strain(&plant.strain),
            days_in_stage: plant.days_in_stage(now),
            analytics: analytics.as_ref(),
            latest_sample: latest_sample.as_ref(),
            history: &history,
            now,
        };

        self.rule_runs.fetch_add(1, AtomicOrdering::Relaxed);
        let mut recommendations = evaluate_all(&ctx);

        recommendations.retain(|r| r.confidence >= options.confidence_threshold);

        // Vec::sort_by is stable, so evaluator order breaks ties
        recommendations.sort_by(|a, b| {
            let wa = a.priority.weight() * a.confidence;
            let wb = b.priority.weight() * b.confidence;
            wb.partial_cmp(&wa).unwrap_or(Ordering::Equal)
        });

        let confidence = if recommendations.is_empty() {
            0.0
        } else {
            recommendations.iter().map(|r| r.confidence).sum::<f64>()
                / recommendations.len() as f64
        };

        let set = RecommendationSet {
            plant_id,
            total_recommendations: recommendations.len(),
            recommendations,
            last_updated: now,
            confidence,
        };

        tracing::info!(
            plant_id = %plant_id,
            total = set.total_recommendations,
            confidence = set.confidence,
            "Recommendations generated"
        );

        self.cache.insert(key, plant_id, set.clone());
        self.event_bus
            .emit_lossy(CultivaEvent::RecommendationsGenerated {
                plant_id,
                total: set.total_recommendations,
                confidence: set.confidence,
                timestamp: now,
            });

        Ok(set)
    }

    /// Drop every cached set for a plant so the next read recomputes.
    /// Called after feedback submission and on forced reprocessing.
    pub fn clear_plant_cache(&self, plant_id: Uuid) {
        let removed = self.cache.clear_plant(plant_id);
        if removed > 0 {
            tracing::debug!(plant_id = %plant_id, removed, "Recommendation cache cleared");
        }
    }
}

/// Deterministic cache key for (plant, result-shaping options).
/// `force_refresh` changes behavior, not the result, so it stays out.
fn cache_key(plant_id: Uuid, options: &GenerateOptions) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plant_id.as_bytes());
    hasher.update([options.include_historical as u8]);
    hasher.update(options.confidence_threshold.to_bits().to_le_bytes());
    format!("{:x}", hasher.finalize())
}
