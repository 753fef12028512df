//! Environmental stage-efficiency scoring
//!
//! Scores each environment dimension against a stage-specific optimal range
//! and combines the scores with fixed weights. VPD is weighted highest
//! because it drives transpiration and nutrient uptake.

use cultiva_common::db::models::{EnvironmentSample, GrowthStage};

use crate::models::EnvironmentalEfficiency;

/// Weight of each dimension in the overall score. CO₂ is scored and stored
/// but does not contribute to the overall sum.
pub const WEIGHT_TEMPERATURE: f64 = 0.25;
pub const WEIGHT_HUMIDITY: f64 = 0.25;
pub const WEIGHT_VPD: f64 = 0.30;
pub const WEIGHT_LIGHT: f64 = 0.20;

/// A stage-specific target band with its optimal midpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeSpec {
    pub min: f64,
    pub optimal: f64,
    pub max: f64,
}

impl RangeSpec {
    const fn new(min: f64, optimal: f64, max: f64) -> Self {
        Self { min, optimal, max }
    }
}

/// Environment dimension identifiers for range lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Temperature,
    Humidity,
    Vpd,
    Light,
    Co2,
}

/// One representative reading per dimension, each independently optional
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnvironmentReading {
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub vpd_kpa: Option<f64>,
    pub ppfd_umol: Option<f64>,
    pub co2_ppm: Option<f64>,
}

impl EnvironmentReading {
    /// Collapse a window of samples into one reading by averaging each
    /// dimension over its non-null values. A dimension with no values at
    /// all stays `None` and will score 0.
    pub fn average(samples: &[EnvironmentSample]) -> Self {
        fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
            let collected: Vec<f64> = values.collect();
            if collected.is_empty() {
                None
            } else {
                Some(collected.iter().sum::<f64>() / collected.len() as f64)
            }
        }

        Self {
            temperature_c: mean(samples.iter().filter_map(|s| s.temperature_c)),
            humidity_pct: mean(samples.iter().filter_map(|s| s.humidity_pct)),
            vpd_kpa: mean(samples.iter().filter_map(|s| s.vpd_kpa)),
            ppfd_umol: mean(samples.iter().filter_map(|s| s.ppfd_umol)),
            co2_ppm: mean(samples.iter().filter_map(|s| s.co2_ppm)),
        }
    }
}

/// Stage-specific optimal range for one environment dimension
pub fn optimal_range(stage: GrowthStage, dimension: Dimension) -> RangeSpec {
    use Dimension::*;
    use GrowthStage::*;

    match (stage, dimension) {
        (Seedling, Temperature) => RangeSpec::new(20.0, 23.0, 25.0),
        (Seedling, Humidity) => RangeSpec::new(65.0, 70.0, 80.0),
        (Seedling, Vpd) => RangeSpec::new(0.4, 0.6, 0.8),
        (Seedling, Light) => RangeSpec::new(100.0, 200.0, 300.0),
        (Seedling, Co2) => RangeSpec::new(400.0, 600.0, 800.0),

        (Vegetative, Temperature) => RangeSpec::new(22.0, 25.0, 28.0),
        (Vegetative, Humidity) => RangeSpec::new(55.0, 62.0, 70.0),
        (Vegetative, Vpd) => RangeSpec::new(0.8, 1.0, 1.2),
        (Vegetative, Light) => RangeSpec::new(300.0, 450.0, 600.0),
        (Vegetative, Co2) => RangeSpec::new(800.0, 1000.0, 1200.0),

        (Flowering, Temperature) => RangeSpec::new(20.0, 24.0, 26.0),
        (Flowering, Humidity) => RangeSpec::new(40.0, 48.0, 55.0),
        (Flowering, Vpd) => RangeSpec::new(1.2, 1.4, 1.6),
        (Flowering, Light) => RangeSpec::new(600.0, 750.0, 900.0),
        (Flowering, Co2) => RangeSpec::new(1000.0, 1200.0, 1400.0),

        (LateFlowering, Temperature) => RangeSpec::new(18.0, 21.0, 24.0),
        (LateFlowering, Humidity) => RangeSpec::new(35.0, 42.0, 50.0),
        (LateFlowering, Vpd) => RangeSpec::new(1.3, 1.5, 1.7),
        (LateFlowering, Light) => RangeSpec::new(600.0, 750.0, 900.0),
        (LateFlowering, Co2) => RangeSpec::new(800.0, 1000.0, 1200.0),

        (Harvest, Temperature) => RangeSpec::new(18.0, 20.0, 22.0),
        (Harvest, Humidity) => RangeSpec::new(40.0, 45.0, 50.0),
        (Harvest, Vpd) => RangeSpec::new(1.0, 1.2, 1.4),
        (Harvest, Light) => RangeSpec::new(0.0, 200.0, 400.0),
        (Harvest, Co2) => RangeSpec::new(400.0, 600.0, 800.0),
    }
}

/// Score a single reading against a range.
///
/// Inside [min, max] the score falls linearly from 1.0 at the optimal to
/// 0.0 at the further band edge; outside the band the score is 0.
pub fn score_reading(value: f64, range: RangeSpec) -> f64 {
    if value < range.min || value > range.max {
        return 0.0;
    }
    let span = (range.optimal - range.min).max(range.max - range.optimal);
    if span <= 0.0 {
        return 1.0;
    }
    let score = 1.0 - (value - range.optimal).abs() / span;
    score.clamp(0.0, 1.0)
}

fn score_optional(value: Option<f64>, range: RangeSpec) -> f64 {
    value.map(|v| score_reading(v, range)).unwrap_or(0.0)
}

/// Compute the five sub-scores and the weighted overall for a stage.
/// Missing inputs score 0 for their dimension only.
pub fn stage_efficiency(stage: GrowthStage, reading: &EnvironmentReading) -> EnvironmentalEfficiency {
    let temperature = score_optional(reading.temperature_c, optimal_range(stage, Dimension::Temperature));
    let humidity = score_optional(reading.humidity_pct, optimal_range(stage, Dimension::Humidity));
    let vpd = score_optional(reading.vpd_kpa, optimal_range(stage, Dimension::Vpd));
    let light = score_optional(reading.ppfd_umol, optimal_range(stage, Dimension::Light));
    let co2 = score_optional(reading.co2_ppm, optimal_range(stage, Dimension::Co2));

    let overall_score = WEIGHT_TEMPERATURE * temperature
        + WEIGHT_HUMIDITY * humidity
        + WEIGHT_VPD * vpd
        + WEIGHT_LIGHT * light;

    EnvironmentalEfficiency {
        temperature,
        humidity,
        vpd,
        light,
        co2,
        overall_score,
    }
}
