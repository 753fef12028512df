//! Recommendation rule set
//!
//! A fixed, ordered, closed set of independent evaluators. Each rule is a
//! pure function of the context: it never mutates shared state, and two
//! evaluations with identical inputs produce identical output apart from
//! the freshly minted recommendation ids.
//!
//! Strain-class adjustments are a fixed offset table applied to the
//! stage-optimal ranges: adding a strain class means adding a table row,
//! not new branching.

use chrono::{DateTime, Utc};
use cultiva_common::db::models::{EnvironmentSample, GrowthStage, Plant};
use uuid::Uuid;

use crate::metrics::efficiency::{optimal_range, score_reading, Dimension, RangeSpec};
use crate::metrics::{stage_default, strain_adjustments, StrainClass};
use crate::models::{AnalyticsRecord, Priority, Recommendation, RecommendedAction, RuleCategory};

/// Everything a rule may look at. Read-only.
pub struct RuleContext<'a> {
    pub plant: &'a Plant,
    pub strain_class: StrainClass,
    pub days_in_stage: i64,
    pub analytics: Option<&'a AnalyticsRecord>,
    pub latest_sample: Option<&'a EnvironmentSample>,
    /// Historical analytics, newest first (may be empty)
    pub history: &'a [AnalyticsRecord],
    pub now: DateTime<Utc>,
}

type RuleFn = fn(&RuleContext) -> Option<Recommendation>;

/// The full rule set in its fixed evaluation order
pub const RULES: &[(&str, RuleCategory, RuleFn)] = &[
    ("vpd_optimization", RuleCategory::Environmental, vpd_optimization),
    ("temperature_optimization", RuleCategory::Environmental, temperature_optimization),
    ("humidity_optimization", RuleCategory::Environmental, humidity_optimization),
    ("deficiency_prevention", RuleCategory::Nutrient, deficiency_prevention),
    ("feeding_schedule", RuleCategory::Nutrient, feeding_schedule),
    ("training_opportunity", RuleCategory::Cultivation, training_opportunity),
    ("pruning_need", RuleCategory::Cultivation, pruning_need),
    ("harvest_timing", RuleCategory::Harvest, harvest_timing),
    ("pre_harvest_optimization", RuleCategory::Harvest, pre_harvest_optimization),
];

/// Run every rule in order and collect the recommendations that fired
pub fn evaluate_all(ctx: &RuleContext) -> Vec<Recommendation> {
    RULES.iter().filter_map(|(_, _, rule)| rule(ctx)).collect()
}

/// Stage-optimal range shifted by the strain-class offset table.
/// Light and CO₂ ranges are strain-independent.
pub fn adjusted_range(stage: GrowthStage, dimension: Dimension, class: StrainClass) -> RangeSpec {
    let range = optimal_range(stage, dimension);
    let adjust = strain_adjustments(class);
    let offset = match dimension {
        Dimension::Temperature => adjust.temperature_offset_c,
        Dimension::Humidity => adjust.humidity_offset_pct,
        Dimension::Vpd => adjust.vpd_offset_kpa,
        Dimension::Light | Dimension::Co2 => 0.0,
    };
    RangeSpec {
        min: range.min + offset,
        optimal: range.optimal + offset,
        max: range.max + offset,
    }
}

fn build(
    rule: &str,
    category: RuleCategory,
    priority: Priority,
    confidence: f64,
    title: String,
    description: String,
    actions: Vec<RecommendedAction>,
    reasoning: String,
    expected_benefit: String,
) -> Recommendation {
    Recommendation {
        id: Uuid::new_v4(),
        category,
        rule: rule.to_string(),
        priority,
        title,
        description,
        actions,
        confidence,
        reasoning,
        expected_benefit,
    }
}

/// Shared shape of the three environmental range rules
fn range_rule(
    ctx: &RuleContext,
    rule: &str,
    dimension: Dimension,
    parameter: &str,
    unit: &str,
    value: Option<f64>,
    out_of_band_confidence: f64,
    off_optimal_confidence: f64,
) -> Option<Recommendation> {
    let value = value?;
    let range = adjusted_range(ctx.plant.stage, dimension, ctx.strain_class);

    if value < range.min || value > range.max {
        let directive = if value < range.min { "raise" } else { "lower" };
        return Some(build(
            rule,
            RuleCategory::Environmental,
            Priority::High,
            out_of_band_confidence,
            format!("Bring {} back into range", parameter),
            format!(
                "Current {} of {:.2}{} is outside the {:.2}-{:.2}{} band for {} {}",
                parameter,
                value,
                unit,
                range.min,
                range.max,
                unit,
                ctx.strain_class.as_str(),
                ctx.plant.stage.as_str(),
            ),
            vec![RecommendedAction {
                parameter: parameter.to_string(),
                directive: directive.to_string(),
                current_value: Some(value),
                target_min: range.min,
                target_max: range.max,
                expected_benefit: "Restores healthy transpiration and nutrient uptake".to_string(),
            }],
            format!(
                "Reading {:.2}{} vs adjusted band [{:.2}, {:.2}]",
                value, unit, range.min, range.max
            ),
            "Prevents stress accumulation over the next days".to_string(),
        ));
    }

    let score = score_reading(value, range);
    if score < 0.7 {
        let directive = if value < range.optimal { "raise" } else { "lower" };
        return Some(build(
            rule,
            RuleCategory::Environmental,
            Priority::Medium,
            off_optimal_confidence,
            format!("Nudge {} toward optimal", parameter),
            format!(
                "{} of {:.2}{} is inside the band but away from the {:.2}{} optimum",
                parameter, value, unit, range.optimal, unit
            ),
            vec![RecommendedAction {
                parameter: parameter.to_string(),
                directive: directive.to_string(),
                current_value: Some(value),
                target_min: range.optimal,
                target_max: range.optimal,
                expected_benefit: "Incremental efficiency gain".to_string(),
            }],
            format!("In-band score {:.2} below the 0.70 comfort line", score),
            "Small but compounding growth improvement".to_string(),
        ));
    }

    None
}

fn vpd_optimization(ctx: &RuleContext) -> Option<Recommendation> {
    range_rule(
        ctx,
        "vpd_optimization",
        Dimension::Vpd,
        "vpd_kpa",
        " kPa",
        ctx.latest_sample.and_then(|s| s.vpd_kpa),
        0.9,
        0.75,
    )
}

fn temperature_optimization(ctx: &RuleContext) -> Option<Recommendation> {
    range_rule(
        ctx,
        "temperature_optimization",
        Dimension::Temperature,
        "temperature_c",
        "°C",
        ctx.latest_sample.and_then(|s| s.temperature_c),
        0.85,
        0.72,
    )
}

fn humidity_optimization(ctx: &RuleContext) -> Option<Recommendation> {
    range_rule(
        ctx,
        "humidity_optimization",
        Dimension::Humidity,
        "humidity_pct",
        "%",
        ctx.latest_sample.and_then(|s| s.humidity_pct),
        0.8,
        0.7,
    )
}

/// Growth lagging while the environment is fine points at nutrition
fn deficiency_prevention(ctx: &RuleContext) -> Option<Recommendation> {
    let analytics = ctx.analytics?;
    let expected = stage_default(ctx.plant.stage);
    if expected <= 0.0 {
        return None;
    }
    if analytics.growth_rate_cm_day < expected * 0.5 && analytics.efficiency.overall_score >= 0.6 {
        return Some(build(
            "deficiency_prevention",
            RuleCategory::Nutrient,
            Priority::Medium,
            0.75,
            "Check for nutrient deficiency".to_string(),
            format!(
                "Growth rate {:.1} cm/day is under half the {:.1} cm/day expected for {} \
                 while the environment scores {:.2}; nutrition is the likely limiter",
                analytics.growth_rate_cm_day,
                expected,
                ctx.plant.stage.as_str(),
                analytics.efficiency.overall_score,
            ),
            vec![RecommendedAction {
                parameter: "feeding".to_string(),
                directive: "review".to_string(),
                current_value: Some(analytics.growth_rate_cm_day),
                target_min: expected,
                target_max: expected * 1.5,
                expected_benefit: "Catches deficiencies before visible damage".to_string(),
            }],
            "Environment healthy but growth lagging".to_string(),
            "Avoids weeks of lost growth from an unnoticed deficiency".to_string(),
        ));
    }
    None
}

/// Feeding changes at stage boundaries
fn feeding_schedule(ctx: &RuleContext) -> Option<Recommendation> {
    match ctx.plant.stage {
        GrowthStage::Flowering if ctx.days_in_stage <= 7 => Some(build(
            "feeding_schedule",
            RuleCategory::Nutrient,
            Priority::High,
            0.85,
            "Transition to bloom nutrients".to_string(),
            format!(
                "Flowering started {} day(s) ago; phosphorus/potassium demand is rising",
                ctx.days_in_stage
            ),
            vec![RecommendedAction {
                parameter: "feeding".to_string(),
                directive: "switch_to_bloom".to_string(),
                current_value: None,
                target_min: 0.0,
                target_max: 0.0,
                expected_benefit: "Supports early flower set".to_string(),
            }],
            "Early flowering window".to_string(),
            "Better flower development through the stretch".to_string(),
        )),
        GrowthStage::Vegetative if ctx.days_in_stage <= 3 => Some(build(
            "feeding_schedule",
            RuleCategory::Nutrient,
            Priority::Low,
            0.7,
            "Begin vegetative feeding".to_string(),
            "The plant just entered vegetative growth; start a nitrogen-forward schedule"
                .to_string(),
            vec![RecommendedAction {
                parameter: "feeding".to_string(),
                directive: "begin_vegetative".to_string(),
                current_value: None,
                target_min: 0.0,
                target_max: 0.0,
                expected_benefit: "Fuels structural growth".to_string(),
            }],
            "Stage transition into vegetative".to_string(),
            "Faster canopy establishment".to_string(),
        )),
        _ => None,
    }
}

/// Mid-vegetative window where training pays off most
fn training_opportunity(ctx: &RuleContext) -> Option<Recommendation> {
    if ctx.plant.stage != GrowthStage::Vegetative || !(14..=35).contains(&ctx.days_in_stage) {
        return None;
    }
    // Sativas stretch hardest, so the window matters more for them
    let confidence = if ctx.strain_class == StrainClass::Sativa {
        0.85
    } else {
        0.8
    };
    Some(build(
        "training_opportunity",
        RuleCategory::Cultivation,
        Priority::Medium,
        confidence,
        "Good window for low-stress training".to_string(),
        format!(
            "Day {} of vegetative growth; stems are pliable and recovery is fast",
            ctx.days_in_stage
        ),
        vec![RecommendedAction {
            parameter: "canopy".to_string(),
            directive: "train".to_string(),
            current_value: None,
            target_min: 0.0,
            target_max: 0.0,
            expected_benefit: "Flatter canopy, more bud sites at light level".to_string(),
        }],
        "Vegetative day count inside the 14-35 training window".to_string(),
        "Higher light utilisation across the canopy".to_string(),
    ))
}

/// Dense canopies in humid flowering tents need airflow pruning
fn pruning_need(ctx: &RuleContext) -> Option<Recommendation> {
    let humidity_score = ctx.analytics.map(|a| a.efficiency.humidity);
    match ctx.plant.stage {
        GrowthStage::Flowering if ctx.days_in_stage <= 14 && humidity_score.is_some_and(|s| s < 0.5) => {
            Some(build(
                "pruning_need",
                RuleCategory::Cultivation,
                Priority::High,
                0.8,
                "Defoliate for airflow".to_string(),
                "Humidity control is struggling in early flower; thinning the canopy \
                 lowers the mold risk where buds are forming"
                    .to_string(),
                vec![RecommendedAction {
                    parameter: "canopy".to_string(),
                    directive: "defoliate".to_string(),
                    current_value: humidity_score,
                    target_min: 0.5,
                    target_max: 1.0,
                    expected_benefit: "Better air exchange through the canopy".to_string(),
                }],
                "Low humidity sub-score during early flowering".to_string(),
                "Reduced bud-rot risk".to_string(),
            ))
        }
        GrowthStage::Vegetative if ctx.days_in_stage > 28 => Some(build(
            "pruning_need",
            RuleCategory::Cultivation,
            Priority::Low,
            0.7,
            "Clean up lower growth".to_string(),
            "Late vegetative plants benefit from removing shaded lower shoots".to_string(),
            vec![RecommendedAction {
                parameter: "canopy".to_string(),
                directive: "lollipop".to_string(),
                current_value: None,
                target_min: 0.0,
                target_max: 0.0,
                expected_benefit: "Redirects energy to productive tops".to_string(),
            }],
            "Extended vegetative duration".to_string(),
            "Less larf, better airflow at the base".to_string(),
        )),
        _ => None,
    }
}

/// Trichome-window heuristic: late flowering age stands in for ripeness
fn harvest_timing(ctx: &RuleContext) -> Option<Recommendation> {
    if ctx.plant.stage != GrowthStage::LateFlowering || ctx.days_in_stage < 14 {
        return None;
    }
    // Confidence ramps with days past the window opening
    let confidence = (0.75 + 0.01 * (ctx.days_in_stage - 14) as f64).min(0.95);
    Some(build(
        "harvest_timing",
        RuleCategory::Harvest,
        Priority::High,
        confidence,
        "Inspect trichomes for harvest readiness".to_string(),
        format!(
            "Day {} of late flowering; most cultivars reach cloudy-dominant trichomes \
             in this window",
            ctx.days_in_stage
        ),
        vec![RecommendedAction {
            parameter: "trichomes".to_string(),
            directive: "inspect".to_string(),
            current_value: None,
            target_min: 0.0,
            target_max: 0.0,
            expected_benefit: "Harvest at peak potency instead of by calendar".to_string(),
        }],
        "Late-flowering duration inside the typical ripening window".to_string(),
        "Peak cannabinoid content at harvest".to_string(),
    ))
}

/// Flush and climate adjustments ahead of harvest
fn pre_harvest_optimization(ctx: &RuleContext) -> Option<Recommendation> {
    if ctx.plant.stage != GrowthStage::LateFlowering || ctx.days_in_stage < 10 {
        return None;
    }
    Some(build(
        "pre_harvest_optimization",
        RuleCategory::Harvest,
        Priority::Medium,
        0.78,
        "Start pre-harvest preparation".to_string(),
        "Begin the final flush and drop humidity to protect ripening buds".to_string(),
        vec![
            RecommendedAction {
                parameter: "feeding".to_string(),
                directive: "flush".to_string(),
                current_value: None,
                target_min: 0.0,
                target_max: 0.0,
                expected_benefit: "Cleaner final product".to_string(),
            },
            RecommendedAction {
                parameter: "humidity_pct".to_string(),
                directive: "lower".to_string(),
                current_value: ctx.latest_sample.and_then(|s| s.humidity_pct),
                target_min: 35.0,
                target_max: 45.0,
                expected_benefit: "Lower mold pressure on dense buds".to_string(),
            },
        ],
        "Late flowering past day 10".to_string(),
        "Smoother finish and safer final weeks".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use cultiva_common::db::models::Plant;

    fn plant(stage: GrowthStage, days_in_stage: i64) -> Plant {
        let now = chrono::Utc::now();
        Plant {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            strain: "Blue Dream".to_string(),
            stage,
            medium: "soil".to_string(),
            tent_id: "tent-1".to_string(),
            planted_at: now - Duration::days(days_in_stage + 30),
            stage_started_at: now - Duration::days(days_in_stage),
            archived: false,
        }
    }

    fn sample(tent_id: &str, vpd: Option<f64>, temp: Option<f64>, humidity: Option<f64>) -> EnvironmentSample {
        EnvironmentSample {
            id: Uuid::new_v4(),
            tent_id: tent_id.to_string(),
            recorded_at: chrono::Utc::now(),
            temperature_c: temp,
            humidity_pct: humidity,
            vpd_kpa: vpd,
            co2_ppm: None,
            ppfd_umol: None,
        }
    }

    fn ctx<'a>(
        plant: &'a Plant,
        latest_sample: Option<&'a EnvironmentSample>,
        analytics: Option<&'a AnalyticsRecord>,
    ) -> RuleContext<'a> {
        let now = chrono::Utc::now();
        RuleContext {
            plant,
            strain_class: StrainClass::Hybrid,
            days_in_stage: plant.days_in_stage(now),
            analytics,
            latest_sample,
            history: &[],
            now,
        }
    }

    #[test]
    fn test_vpd_rule_fires_high_when_out_of_band() {
        let plant = plant(GrowthStage::Vegetative, 10);
        // Vegetative band is 0.8-1.2 kPa for hybrids
        let sample = sample("tent-1", Some(2.0), None, None);
        let context = ctx(&plant, Some(&sample), None);

        let rec = vpd_optimization(&context).expect("rule should fire");
        assert_eq!(rec.priority, Priority::High);
        assert!((rec.confidence - 0.9).abs() < 1e-9);
        assert_eq!(rec.actions[0].directive, "lower");
    }

    #[test]
    fn test_vpd_rule_silent_at_optimal() {
        let plant = plant(GrowthStage::Vegetative, 10);
        let sample = sample("tent-1", Some(1.0), None, None);
        let context = ctx(&plant, Some(&sample), None);
        assert!(vpd_optimization(&context).is_none());
    }

    #[test]
    fn test_rules_silent_without_data() {
        let plant = plant(GrowthStage::Seedling, 3);
        let context = ctx(&plant, None, None);
        // No sample and no analytics: environmental and nutrient rules
        // must stay silent instead of erroring
        assert!(vpd_optimization(&context).is_none());
        assert!(temperature_optimization(&context).is_none());
        assert!(humidity_optimization(&context).is_none());
        assert!(deficiency_prevention(&context).is_none());
    }

    #[test]
    fn test_harvest_timing_confidence_ramps_and_caps() {
        let early = plant(GrowthStage::LateFlowering, 14);
        let context = ctx(&early, None, None);
        let rec = harvest_timing(&context).unwrap();
        assert!((rec.confidence - 0.75).abs() < 1e-9);

        let late = plant(GrowthStage::LateFlowering, 60);
        let context = ctx(&late, None, None);
        let rec = harvest_timing(&context).unwrap();
        assert!((rec.confidence - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_training_window_bounds() {
        let before = plant(GrowthStage::Vegetative, 13);
        assert!(training_opportunity(&ctx(&before, None, None)).is_none());

        let inside = plant(GrowthStage::Vegetative, 20);
        assert!(training_opportunity(&ctx(&inside, None, None)).is_some());

        let after = plant(GrowthStage::Vegetative, 36);
        assert!(training_opportunity(&ctx(&after, None, None)).is_none());
    }

    #[test]
    fn test_strain_offset_shifts_band() {
        let hybrid = adjusted_range(GrowthStage::Vegetative, Dimension::Vpd, StrainClass::Hybrid);
        let indica = adjusted_range(GrowthStage::Vegetative, Dimension::Vpd, StrainClass::Indica);
        assert!((hybrid.optimal - indica.optimal - 0.1).abs() < 1e-9);
        // Light is strain-independent
        let hybrid_light = adjusted_range(GrowthStage::Vegetative, Dimension::Light, StrainClass::Hybrid);
        let indica_light = adjusted_range(GrowthStage::Vegetative, Dimension::Light, StrainClass::Indica);
        assert_eq!(hybrid_light, indica_light);
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let plant = plant(GrowthStage::LateFlowering, 20);
        let sample = sample("tent-1", Some(2.5), Some(30.0), Some(70.0));
        let context = ctx(&plant, Some(&sample), None);

        let first = evaluate_all(&context);
        let second = evaluate_all(&context);
        assert_eq!(first.len(), second.len());
        // Identical apart from freshly minted ids
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.rule, b.rule);
            assert_eq!(a.priority, b.priority);
            assert_eq!(a.confidence, b.confidence);
            assert_eq!(a.title, b.title);
            assert_eq!(a.actions, b.actions);
        }
    }

    #[test]
    fn test_rule_order_is_fixed() {
        let names: Vec<&str> = RULES.iter().map(|(name, _, _)| *name).collect();
        assert_eq!(
            names,
            vec![
                "vpd_optimization",
                "temperature_optimization",
                "humidity_optimization",
                "deficiency_prevention",
                "feeding_schedule",
                "training_opportunity",
                "pruning_need",
                "harvest_timing",
                "pre_harvest_optimization",
            ]
        );
    }
}
