//! Growth-rate computation from height measurements

use chrono::{DateTime, Utc};
use cultiva_common::db::models::GrowthStage;

/// Measurements considered per computation (most recent first wins)
const WINDOW: usize = 5;

/// Growth-rate bounds in cm/day
pub const GROWTH_RATE_MIN: f64 = 0.0;
pub const GROWTH_RATE_MAX: f64 = 10.0;

/// One (timestamp, height) pair extracted from the activity log
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightMeasurement {
    pub recorded_at: DateTime<Utc>,
    pub height_cm: f64,
}

/// Default growth rate in cm/day when measurements are insufficient.
/// Late flowering shares the flowering default; vertical growth tapers but
/// has not stopped.
pub fn stage_default(stage: GrowthStage) -> f64 {
    match stage {
        GrowthStage::Seedling => 0.5,
        GrowthStage::Vegetative => 2.0,
        GrowthStage::Flowering | GrowthStage::LateFlowering => 0.8,
        GrowthStage::Harvest => 0.0,
    }
}

/// Compute the average growth rate over the last measurements.
///
/// Takes the last 5 chronologically sorted measurements, computes
/// Δheight/Δdays for each interval with Δheight ≥ 0 and Δtime > 0, and
/// averages them. Falls back to the stage default when fewer than 2
/// measurements exist or no interval is valid. The result is clamped to
/// [0, 10] cm/day and is never NaN.
pub fn growth_rate(measurements: &[HeightMeasurement], stage: GrowthStage) -> f64 {
    if measurements.len() < 2 {
        return stage_default(stage).clamp(GROWTH_RATE_MIN, GROWTH_RATE_MAX);
    }

    let start = measurements.len().saturating_sub(WINDOW);
    let recent = &measurements[start..];

    let mut rates = Vec::with_capacity(recent.len() - 1);
    for pair in recent.windows(2) {
        let delta_height = pair[1].height_cm - pair[0].height_cm;
        let delta_days =
            (pair[1].recorded_at - pair[0].recorded_at).num_seconds() as f64 / 86_400.0;
        // Shrinking plants and zero-length intervals are measurement noise
        if delta_height >= 0.0 && delta_days > 0.0 {
            rates.push(delta_height / delta_days);
        }
    }

    if rates.is_empty() {
        return stage_default(stage).clamp(GROWTH_RATE_MIN, GROWTH_RATE_MAX);
    }

    let average = rates.iter().sum::<f64>() / rates.len() as f64;
    average.clamp(GROWTH_RATE_MIN, GROWTH_RATE_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn measurement(day: i64, height_cm: f64) -> HeightMeasurement {
        let base = chrono::Utc::now() - Duration::days(30);
        HeightMeasurement {
            recorded_at: base + Duration::days(day),
            height_cm,
        }
    }

    #[test]
    fn test_vegetative_three_measurement_scenario() {
        // 10cm day 0, 14cm day 2, 20cm day 5:
        // intervals (4/2, 6/3) -> (2.0 + 2.0) / 2 = 2.0 cm/day
        let measurements = vec![
            measurement(0, 10.0),
            measurement(2, 14.0),
            measurement(5, 20.0),
        ];
        let rate = growth_rate(&measurements, GrowthStage::Vegetative);
        assert!((rate - 2.0).abs() < 1e-9, "expected 2.0, got {}", rate);
    }

    #[test]
    fn test_fewer_than_two_measurements_returns_stage_default() {
        assert_eq!(growth_rate(&[], GrowthStage::Seedling), 0.5);
        assert_eq!(
            growth_rate(&[measurement(0, 12.0)], GrowthStage::Vegetative),
            2.0
        );
        assert_eq!(growth_rate(&[], GrowthStage::Flowering), 0.8);
        assert_eq!(growth_rate(&[], GrowthStage::LateFlowering), 0.8);
        assert_eq!(growth_rate(&[], GrowthStage::Harvest), 0.0);
    }

    #[test]
    fn test_negative_intervals_are_dropped() {
        // Height drop between day 2 and day 3 is ignored; only the two
        // growing intervals count
        let measurements = vec![
            measurement(0, 10.0),
            measurement(2, 14.0), // +2.0/day
            measurement(3, 12.0), // dropped
            measurement(5, 16.0), // +2.0/day
        ];
        let rate = growth_rate(&measurements, GrowthStage::Vegetative);
        assert!((rate - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_invalid_intervals_fall_back_to_default() {
        // Strictly shrinking: every interval dropped
        let measurements = vec![
            measurement(0, 20.0),
            measurement(2, 18.0),
            measurement(4, 15.0),
        ];
        assert_eq!(growth_rate(&measurements, GrowthStage::Flowering), 0.8);
    }

    #[test]
    fn test_only_last_five_measurements_count() {
        // Six measurements; the first (explosive) interval falls outside
        // the window of 5 and must not influence the result
        let measurements = vec![
            measurement(0, 0.0),
            measurement(1, 50.0), // outside window
            measurement(2, 51.0),
            measurement(3, 52.0),
            measurement(4, 53.0),
            measurement(5, 54.0),
        ];
        let rate = growth_rate(&measurements, GrowthStage::Vegetative);
        assert!((rate - 1.0).abs() < 1e-9, "expected 1.0, got {}", rate);
    }

    #[test]
    fn test_result_is_clamped_to_upper_bound() {
        // 100 cm in one day
        let measurements = vec![measurement(0, 0.0), measurement(1, 100.0)];
        assert_eq!(growth_rate(&measurements, GrowthStage::Vegetative), 10.0);
    }

    #[test]
    fn test_never_nan() {
        // Two measurements at the same instant: interval invalid, default
        let at = chrono::Utc::now();
        let measurements = vec![
            HeightMeasurement { recorded_at: at, height_cm: 10.0 },
            HeightMeasurement { recorded_at: at, height_cm: 12.0 },
        ];
        let rate = growth_rate(&measurements, GrowthStage::Vegetative);
        assert!(!rate.is_nan());
        assert_eq!(rate, 2.0);
    }
}
