//! Analytics Engine
//!
//! Orchestrates the metric library over a plant's historical window,
//! assembles an analytics record, and decides whether recomputation is
//! needed at all.

use chrono::{DateTime, Duration, Utc};
use cultiva_common::db::models::{ActivityType, GrowthStage};
use cultiva_common::events::{CultivaEvent, EventBus};
use cultiva_common::{time, Result};
use sqlx::SqlitePool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::db;
use crate::metrics::{
    self, classify_strain, normalize_medium, EnvironmentReading, HeightMeasurement,
};
use crate::models::{AnalyticsRecord, EmbeddedRecommendation, EnvironmentalEfficiency, NewAnalyticsRecord};
use crate::store::AnalyticsStore;

/// Default historical window loaded per computation
const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Freshness window for on-demand calls
pub const DEFAULT_FRESHNESS_HOURS: i64 = 24;

/// Freshness window for scheduler-driven calls
pub const SCHEDULER_FRESHNESS_HOURS: i64 = 6;

/// Most embedded textual recommendations carried on a record
const MAX_EMBEDDED_RECOMMENDATIONS: usize = 5;

/// Options for one `process` call
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub force_recalculation: bool,
    /// A latest record younger than this is returned unchanged
    pub freshness: Duration,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            force_recalculation: false,
            freshness: Duration::hours(DEFAULT_FRESHNESS_HOURS),
        }
    }
}

impl ProcessOptions {
    /// Options used by the background scheduler (shorter freshness window)
    pub fn scheduled() -> Self {
        Self {
            freshness: Duration::hours(SCHEDULER_FRESHNESS_HOURS),
            ..Self::default()
        }
    }
}

/// Result of one `process` call
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub record: AnalyticsRecord,
    /// False when a sufficiently fresh record was returned unchanged
    pub recomputed: bool,
}

/// Computes and persists analytics records
#[derive(Clone)]
pub struct AnalyticsEngine {
    db: SqlitePool,
    store: AnalyticsStore,
    event_bus: EventBus,
}

impl AnalyticsEngine {
    pub fn new(db: SqlitePool, event_bus: EventBus) -> Self {
        let store = AnalyticsStore::new(db.clone());
        Self {
            db,
            store,
            event_bus,
        }
    }

    /// The store this engine writes through
    pub fn store(&self) -> &AnalyticsStore {
        &self.store
    }

    /// Compute (or reuse) the analytics record for a plant.
    ///
    /// Unless `force_recalculation` is set, a latest record younger than
    /// the freshness window is returned unchanged (a skip, not an error).
    /// Missing samples or measurements never fail the computation; the
    /// affected metrics degrade to documented defaults instead.
    pub async fn process(&self, plant_id: Uuid, options: ProcessOptions) -> Result<ProcessOutcome> {
        let now = time::now();

        if !options.force_recalculation {
            if let Some(latest) = self.store.get_latest(plant_id).await? {
                if now - latest.calculated_at <= options.freshness {
                    tracing::debug!(
                        plant_id = %plant_id,
                        calculated_at = %latest.calculated_at,
                        "Analytics record still fresh, skipping recomputation"
                    );
                    return Ok(ProcessOutcome {
                        record: latest,
                        recomputed: false,
                    });
                }
            }
        }

        let plant = db::plants::get_plant(&self.db, plant_id).await?;

        let end = options.end_date.unwrap_or(now);
        let start = options
            .start_date
            .unwrap_or(end - Duration::days(DEFAULT_WINDOW_DAYS));
        let window_days = (end - start).num_days().max(1);

        let samples = db::samples::load_range(&self.db, &plant.tent_id, start, end).await?;
        let activities = db::activity::load_range(&self.db, plant_id, start, end).await?;

        // Height measurements ride on the activity log
        let measurements: Vec<HeightMeasurement> = activities
            .iter()
            .filter(|a| a.activity == ActivityType::Measurement)
            .filter_map(|a| {
                a.value.map(|height_cm| HeightMeasurement {
                    recorded_at: a.recorded_at,
                    height_cm,
                })
            })
            .collect();

        let growth_rate = metrics::growth_rate(&measurements, plant.stage);

        let reading = EnvironmentReading::average(&samples);
        let efficiency = metrics::stage_efficiency(plant.stage, &reading);

        let strain_class = classify_strain(&plant.strain);
        let medium = normalize_medium(&plant.medium);
        let yield_prediction = metrics::yield_prediction(
            strain_class,
            medium,
            efficiency.overall_score,
            plant.stage,
            plant.days_in_stage(now),
            activities.len(),
            window_days,
        );

        let recommendations = derive_embedded_recommendations(plant.stage, &efficiency, growth_rate);

        let record = self
            .store
            .create(NewAnalyticsRecord {
                plant_id,
                calculated_at: now,
                yield_prediction_g: yield_prediction,
                growth_rate_cm_day: growth_rate,
                efficiency: efficiency_map(&efficiency),
                recommendations,
            })
            .await?;

        tracing::info!(
            plant_id = %plant_id,
            yield_g = record.yield_prediction_g,
            growth_cm_day = record.growth_rate_cm_day,
            overall_efficiency = record.efficiency.overall_score,
            samples = samples.len(),
            activities = activities.len(),
            "Analytics computed"
        );

        self.event_bus.emit_lossy(CultivaEvent::AnalyticsComputed {
            plant_id,
            yield_prediction_g: record.yield_prediction_g,
            growth_rate_cm_day: record.growth_rate_cm_day,
            overall_efficiency: record.efficiency.overall_score,
            timestamp: now,
        });

        Ok(ProcessOutcome {
            record,
            recomputed: true,
        })
    }
}

fn efficiency_map(efficiency: &EnvironmentalEfficiency) -> HashMap<String, f64> {
    HashMap::from([
        ("temperature".to_string(), efficiency.temperature),
        ("humidity".to_string(), efficiency.humidity),
        ("vpd".to_string(), efficiency.vpd),
        ("light".to_string(), efficiency.light),
        ("co2".to_string(), efficiency.co2),
    ])
}

/// Legacy textual recommendations embedded on the record, derived from
/// stage/efficiency thresholds. Bounded to 5 entries.
fn derive_embedded_recommendations(
    stage: GrowthStage,
    efficiency: &EnvironmentalEfficiency,
    growth_rate: f64,
) -> Vec<EmbeddedRecommendation> {
    let mut recommendations = Vec::new();

    if efficiency.vpd < 0.5 {
        recommendations.push(EmbeddedRecommendation {
            rec_type: "environment".to_string(),
            message: format!(
                "VPD is far from the {} target band; adjust temperature or humidity to bring it back",
                stage.as_str()
            ),
        });
    }
    if efficiency.temperature < 0.5 {
        recommendations.push(EmbeddedRecommendation {
            rec_type: "environment".to_string(),
            message: format!("Temperature is outside the comfortable {} range", stage.as_str()),
        });
    }
    if efficiency.humidity < 0.5 {
        recommendations.push(EmbeddedRecommendation {
            rec_type: "environment".to_string(),
            message: format!("Humidity needs correction for the {} stage", stage.as_str()),
        });
    }
    if efficiency.light < 0.5 && stage != GrowthStage::Harvest {
        recommendations.push(EmbeddedRecommendation {
            rec_type: "environment".to_string(),
            message: "Light intensity is off target; check PPFD at canopy height".to_string(),
        });
    }

    let expected = metrics::stage_default(stage);
    if expected > 0.0 && growth_rate < expected * 0.5 {
        recommendations.push(EmbeddedRecommendation {
            rec_type: "growth".to_string(),
            message: format!(
                "Growth rate {:.1} cm/day is well below the {:.1} cm/day typical for {}",
                growth_rate,
                expected,
                stage.as_str()
            ),
        });
    }

    recommendations.truncate(MAX_EMBEDDED_RECOMMENDATIONS);
    recommendations
}
