//! Yield prediction from strain base tables and multipliers

use cultiva_common::db::models::GrowthStage;

use super::strain::{Medium, StrainClass};

/// Yield prediction bounds in grams
pub const YIELD_MIN_G: f64 = 10.0;
pub const YIELD_MAX_G: f64 = 2000.0;

/// Care multiplier bounds
const CARE_BASELINE: f64 = 0.8;
const CARE_CAP: f64 = 1.2;

/// Base yield in grams by (strain class × medium)
pub fn base_yield(class: StrainClass, medium: Medium) -> f64 {
    match (class, medium) {
        (StrainClass::Indica, Medium::Soil) => 400.0,
        (StrainClass::Indica, Medium::Coco) => 450.0,
        (StrainClass::Indica, Medium::Hydro) => 500.0,
        (StrainClass::Sativa, Medium::Soil) => 450.0,
        (StrainClass::Sativa, Medium::Coco) => 500.0,
        (StrainClass::Sativa, Medium::Hydro) => 550.0,
        (StrainClass::Hybrid, Medium::Soil) => 425.0,
        (StrainClass::Hybrid, Medium::Coco) => 475.0,
        (StrainClass::Hybrid, Medium::Hydro) => 525.0,
        (StrainClass::Auto, Medium::Soil) => 250.0,
        (StrainClass::Auto, Medium::Coco) => 300.0,
        (StrainClass::Auto, Medium::Hydro) => 350.0,
    }
}

/// Typical stage duration in days, used for the stall adjustment
fn typical_stage_days(stage: GrowthStage) -> i64 {
    match stage {
        GrowthStage::Seedling => 14,
        GrowthStage::Vegetative => 35,
        GrowthStage::Flowering => 42,
        GrowthStage::LateFlowering => 21,
        GrowthStage::Harvest => 7,
    }
}

/// Stage-progression multiplier.
///
/// Later stages carry more certainty about the final yield. A plant that
/// has sat in a stage past 1.5× its typical duration is treated as stalled
/// and penalized slightly.
pub fn stage_multiplier(stage: GrowthStage, days_in_stage: i64) -> f64 {
    let base = match stage {
        GrowthStage::Seedling => 0.7,
        GrowthStage::Vegetative => 0.85,
        GrowthStage::Flowering => 1.0,
        GrowthStage::LateFlowering => 1.1,
        GrowthStage::Harvest => 1.15,
    };
    let typical = typical_stage_days(stage);
    if days_in_stage > typical + typical / 2 {
        base * 0.9
    } else {
        base
    }
}

/// Care-quality multiplier: 0.8 baseline plus 0.1 per activity-per-30-days,
/// capped at 1.2.
pub fn care_multiplier(activity_count: usize, window_days: i64) -> f64 {
    if window_days <= 0 {
        return CARE_BASELINE;
    }
    let per_30_days = activity_count as f64 / window_days as f64 * 30.0;
    (CARE_BASELINE + 0.1 * per_30_days).min(CARE_CAP)
}

/// Predict yield in grams.
///
/// base(strain × medium) × environmental multiplier (0.5 + overall score)
/// × stage-progression multiplier × care multiplier, clamped to [10, 2000].
pub fn yield_prediction(
    class: StrainClass,
    medium: Medium,
    overall_score: f64,
    stage: GrowthStage,
    days_in_stage: i64,
    activity_count: usize,
    window_days: i64,
) -> f64 {
    let environmental = 0.5 + overall_score.clamp(0.0, 1.0);
    let predicted = base_yield(class, medium)
        * environmental
        * stage_multiplier(stage, days_in_stage)
        * care_multiplier(activity_count, window_days);
    predicted.clamp(YIELD_MIN_G, YIELD_MAX_G)
}
