//! Analytics record models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Five named environmental efficiency sub-scores plus the weighted overall.
///
/// Every sub-score is in [0, 1]. The overall score is the fixed weighted sum
/// (temperature 0.25, humidity 0.25, vpd 0.30, light 0.20; co2 is stored but
/// carries no weight).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalEfficiency {
    pub temperature: f64,
    pub humidity: f64,
    pub vpd: f64,
    pub light: f64,
    pub co2: f64,
    pub overall_score: f64,
}

impl EnvironmentalEfficiency {
    /// The zero snapshot used when no environment data exists for a window
    pub fn zero() -> Self {
        Self {
            temperature: 0.0,
            humidity: 0.0,
            vpd: 0.0,
            light: 0.0,
            co2: 0.0,
            overall_score: 0.0,
        }
    }
}

/// Legacy embedded textual recommendation carried on the analytics record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedRecommendation {
    #[serde(rename = "type")]
    pub rec_type: String,
    pub message: String,
}

/// Input to `AnalyticsStore::create`.
///
/// Sub-scores arrive as a loose key → value map (callers at the boundary
/// hand over plain JSON records); the store coerces them into the canonical
/// five-key shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAnalyticsRecord {
    pub plant_id: Uuid,
    pub calculated_at: DateTime<Utc>,
    pub yield_prediction_g: f64,
    pub growth_rate_cm_day: f64,
    pub efficiency: HashMap<String, f64>,
    pub recommendations: Vec<EmbeddedRecommendation>,
}

/// One computed analytics snapshot for a plant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsRecord {
    pub id: Uuid,
    pub plant_id: Uuid,
    pub calculated_at: DateTime<Utc>,
    pub yield_prediction_g: f64,
    pub growth_rate_cm_day: f64,
    pub efficiency: EnvironmentalEfficiency,
    pub recommendations: Vec<EmbeddedRecommendation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One (timestamp, value) point in a trend series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Three parallel raw time series for charting. No interpolation; every
/// point comes straight from a stored record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendSeries {
    pub yield_trend: Vec<TrendPoint>,
    pub growth_trend: Vec<TrendPoint>,
    pub efficiency_trend: Vec<TrendPoint>,
}
