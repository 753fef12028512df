//! Analytics Store
//!
//! Trust boundary for analytics rows. Everything written through `create`
//! is range-validated and coerced into the canonical shape; reads and
//! deletes are thin accessors over the db layer.

use chrono::{DateTime, Utc};
use cultiva_common::{time, Error, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db;
use crate::metrics::efficiency::{WEIGHT_HUMIDITY, WEIGHT_LIGHT, WEIGHT_TEMPERATURE, WEIGHT_VPD};
use crate::metrics::growth::{GROWTH_RATE_MAX, GROWTH_RATE_MIN};
use crate::metrics::yield_model::YIELD_MAX_G;
use crate::models::{
    AnalyticsRecord, EmbeddedRecommendation, EnvironmentalEfficiency, NewAnalyticsRecord,
    TrendSeries,
};

/// Longest embedded recommendation message accepted
const MAX_MESSAGE_LEN: usize = 500;

/// Validating store for analytics records
#[derive(Clone)]
pub struct AnalyticsStore {
    db: SqlitePool,
}

impl AnalyticsStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Validate, coerce, and persist a new analytics record.
    ///
    /// Range violations are collected and rejected together so the caller
    /// sees every bad field at once; nothing is persisted on rejection.
    /// Sub-scores are coerced into the canonical five-key shape and
    /// malformed embedded recommendations are dropped rather than failing
    /// the write.
    pub async fn create(&self, new: NewAnalyticsRecord) -> Result<AnalyticsRecord> {
        let mut violations = Vec::new();
        if !(0.0..=YIELD_MAX_G).contains(&new.yield_prediction_g) || new.yield_prediction_g.is_nan() {
            violations.push(format!(
                "yield_prediction_g must be within [0, {}], got {}",
                YIELD_MAX_G, new.yield_prediction_g
            ));
        }
        if !(GROWTH_RATE_MIN..=GROWTH_RATE_MAX).contains(&new.growth_rate_cm_day)
            || new.growth_rate_cm_day.is_nan()
        {
            violations.push(format!(
                "growth_rate_cm_day must be within [{}, {}], got {}",
                GROWTH_RATE_MIN, GROWTH_RATE_MAX, new.growth_rate_cm_day
            ));
        }
        if !violations.is_empty() {
            return Err(Error::Validation { fields: violations });
        }

        let efficiency = coerce_efficiency(&new.efficiency);
        let recommendations = filter_recommendations(new.recommendations);

        let now = time::now();
        let record = AnalyticsRecord {
            id: Uuid::new_v4(),
            plant_id: new.plant_id,
            calculated_at: new.calculated_at,
            yield_prediction_g: new.yield_prediction_g,
            growth_rate_cm_day: new.growth_rate_cm_day,
            efficiency,
            recommendations,
            created_at: now,
            updated_at: now,
        };

        db::analytics::insert_record(&self.db, &record).await?;

        tracing::debug!(
            plant_id = %record.plant_id,
            record_id = %record.id,
            yield_g = record.yield_prediction_g,
            "Analytics record persisted"
        );

        Ok(record)
    }

    /// Most recent record for a plant, if any
    pub async fn get_latest(&self, plant_id: Uuid) -> Result<Option<AnalyticsRecord>> {
        db::analytics::latest_for_plant(&self.db, plant_id).await
    }

    /// Records for a plant, newest first
    pub async fn get_by_plant_id(&self, plant_id: Uuid, limit: i64) -> Result<Vec<AnalyticsRecord>> {
        db::analytics::list_for_plant(&self.db, plant_id, limit).await
    }

    /// Raw trend series over the last `days` days, no interpolation
    pub async fn get_trends(&self, plant_id: Uuid, days: i64) -> Result<TrendSeries> {
        db::analytics::trends(&self.db, plant_id, days).await
    }

    /// Delete every record for a plant
    pub async fn delete_by_plant_id(&self, plant_id: Uuid) -> Result<u64> {
        db::analytics::delete_for_plant(&self.db, plant_id).await
    }

    /// Delete records calculated before the cutoff (retention sweep)
    pub async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        db::analytics::delete_older_than(&self.db, cutoff).await
    }

    /// Delete records whose plant no longer exists (orphan sweep)
    pub async fn delete_orphans(&self) -> Result<u64> {
        db::analytics::delete_orphans(&self.db).await
    }
}

/// Coerce a loose sub-score map into the canonical five-key shape.
/// Unrecognized keys are dropped, missing keys default to 0, every score is
/// clamped to [0, 1], and the overall is recomputed from the fixed weights
/// so it always matches its sub-scores.
fn coerce_efficiency(raw: &std::collections::HashMap<String, f64>) -> EnvironmentalEfficiency {
    fn score(raw: &std::collections::HashMap<String, f64>, key: &str) -> f64 {
        raw.get(key).copied().unwrap_or(0.0).clamp(0.0, 1.0)
    }

    let temperature = score(raw, "temperature");
    let humidity = score(raw, "humidity");
    let vpd = score(raw, "vpd");
    let light = score(raw, "light");
    let co2 = score(raw, "co2");

    EnvironmentalEfficiency {
        temperature,
        humidity,
        vpd,
        light,
        co2,
        overall_score: WEIGHT_TEMPERATURE * temperature
            + WEIGHT_HUMIDITY * humidity
            + WEIGHT_VPD * vpd
            + WEIGHT_LIGHT * light,
    }
}

/// Drop malformed embedded recommendations instead of rejecting the write
fn filter_recommendations(entries: Vec<EmbeddedRecommendation>) -> Vec<EmbeddedRecommendation> {
    entries
        .into_iter()
        .filter(|r| {
            let keep = !r.rec_type.trim().is_empty()
                && !r.message.trim().is_empty()
                && r.message.len() <= MAX_MESSAGE_LEN;
            if !keep {
                tracing::debug!(rec_type = %r.rec_type, "Dropping malformed embedded recommendation");
            }
            keep
        })
        .collect()
}
