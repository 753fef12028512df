//! Analytics engine integration tests

mod helpers;

use cultiva_common::db::models::GrowthStage;
use cultiva_common::events::EventBus;
use cultiva_common::Error;
use cultiva_engine::{AnalyticsEngine, ProcessOptions};
use uuid::Uuid;

fn engine(pool: &sqlx::SqlitePool) -> AnalyticsEngine {
    AnalyticsEngine::new(pool.clone(), EventBus::new(16))
}

#[tokio::test]
async fn process_creates_record_for_plant_without_any_data() {
    let pool = helpers::test_pool().await;
    let plant = helpers::seed_plant(&pool, GrowthStage::Vegetative, "Blue Dream", "soil", 10).await;
    let engine = engine(&pool);

    let outcome = engine
        .process(plant.id, ProcessOptions::default())
        .await
        .unwrap();

    assert!(outcome.recomputed);
    let record = outcome.record;

    // No samples: efficiency degrades to all zeros, no error
    assert_eq!(record.efficiency.temperature, 0.0);
    assert_eq!(record.efficiency.humidity, 0.0);
    assert_eq!(record.efficiency.vpd, 0.0);
    assert_eq!(record.efficiency.light, 0.0);
    assert_eq!(record.efficiency.co2, 0.0);
    assert_eq!(record.efficiency.overall_score, 0.0);

    // No measurements: stage default growth rate
    assert!((record.growth_rate_cm_day - 2.0).abs() < 1e-9);

    // Yield hits the multiplier floors:
    // hybrid/soil base 425 x 0.5 environmental x 0.85 stage x 0.8 care
    let expected_yield = 425.0 * 0.5 * 0.85 * 0.8;
    assert!((record.yield_prediction_g - expected_yield).abs() < 1e-6);
}

#[tokio::test]
async fn process_unknown_plant_is_not_found() {
    let pool = helpers::test_pool().await;
    let engine = engine(&pool);

    let result = engine.process(Uuid::new_v4(), ProcessOptions::default()).await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn process_skips_when_record_is_fresh() {
    let pool = helpers::test_pool().await;
    let plant = helpers::seed_plant(&pool, GrowthStage::Vegetative, "Blue Dream", "soil", 10).await;
    let engine = engine(&pool);

    let first = engine
        .process(plant.id, ProcessOptions::default())
        .await
        .unwrap();
    assert!(first.recomputed);

    // Second call inside the freshness window returns the same record
    let second = engine
        .process(plant.id, ProcessOptions::default())
        .await
        .unwrap();
    assert!(!second.recomputed);
    assert_eq!(second.record.id, first.record.id);
}

#[tokio::test]
async fn force_recalculation_bypasses_freshness() {
    let pool = helpers::test_pool().await;
    let plant = helpers::seed_plant(&pool, GrowthStage::Vegetative, "Blue Dream", "soil", 10).await;
    let engine = engine(&pool);

    let first = engine
        .process(plant.id, ProcessOptions::default())
        .await
        .unwrap();

    let forced = engine
        .process(
            plant.id,
            ProcessOptions {
                force_recalculation: true,
                ..ProcessOptions::default()
            },
        )
        .await
        .unwrap();

    assert!(forced.recomputed);
    assert_ne!(forced.record.id, first.record.id);
}

#[tokio::test]
async fn growth_rate_from_three_measurements() {
    let pool = helpers::test_pool().await;
    let plant = helpers::seed_plant(&pool, GrowthStage::Vegetative, "Blue Dream", "soil", 15).await;

    // 10cm, then 14cm two days later, then 20cm three days after that:
    // intervals are 2.0 and 2.0 cm/day
    helpers::seed_measurement(&pool, plant.id, 10, 10.0).await;
    helpers::seed_measurement(&pool, plant.id, 8, 14.0).await;
    helpers::seed_measurement(&pool, plant.id, 5, 20.0).await;

    let outcome = engine(&pool)
        .process(plant.id, ProcessOptions::default())
        .await
        .unwrap();

    assert!(
        (outcome.record.growth_rate_cm_day - 2.0).abs() < 1e-6,
        "expected 2.0 cm/day, got {}",
        outcome.record.growth_rate_cm_day
    );
}

#[tokio::test]
async fn optimal_environment_scores_one() {
    let pool = helpers::test_pool().await;
    let plant = helpers::seed_plant(&pool, GrowthStage::Flowering, "Blue Dream", "coco", 20).await;
    for days_ago in 1..=3 {
        helpers::seed_sample_at_optimal(&pool, &plant.tent_id, GrowthStage::Flowering, days_ago).await;
    }

    let outcome = engine(&pool)
        .process(plant.id, ProcessOptions::default())
        .await
        .unwrap();

    let efficiency = outcome.record.efficiency;
    assert!((efficiency.overall_score - 1.0).abs() < 1e-9);
    assert_eq!(efficiency.co2, 1.0);
    // A perfect environment produces no embedded complaints
    assert!(outcome.record.recommendations.is_empty());
}

#[tokio::test]
async fn process_emits_analytics_computed_event() {
    let pool = helpers::test_pool().await;
    let plant = helpers::seed_plant(&pool, GrowthStage::Seedling, "Auto Haze", "coco", 5).await;

    let event_bus = EventBus::new(16);
    let mut rx = event_bus.subscribe();
    let engine = AnalyticsEngine::new(pool.clone(), event_bus);

    engine
        .process(plant.id, ProcessOptions::default())
        .await
        .unwrap();

    match rx.try_recv().unwrap() {
        cultiva_common::events::CultivaEvent::AnalyticsComputed { plant_id, .. } => {
            assert_eq!(plant_id, plant.id);
        }
        other => panic!("Unexpected event: {:?}", other),
    }
}
