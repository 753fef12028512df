//! Recommendation engine integration tests

mod helpers;

use cultiva_common::db::models::GrowthStage;
use cultiva_common::events::EventBus;
use cultiva_common::Error;
use cultiva_engine::{GenerateOptions, RecommendationCache, RecommendationEngine};
use std::sync::Arc;
use uuid::Uuid;

fn engine(pool: &sqlx::SqlitePool) -> RecommendationEngine {
    RecommendationEngine::new(
        pool.clone(),
        Arc::new(RecommendationCache::default()),
        EventBus::new(16),
    )
}

/// Late-flowering plant in a hot, humid, high-VPD tent: several rules fire
async fn seed_struggling_plant(pool: &sqlx::SqlitePool) -> cultiva_common::db::models::Plant {
    let plant =
        helpers::seed_plant(pool, GrowthStage::LateFlowering, "Northern Lights", "soil", 20).await;
    helpers::seed_sample(
        pool,
        &plant.tent_id,
        0,
        Some(30.0), // far above the late-flowering band
        Some(70.0), // far above
        Some(2.5),  // far above
        None,
        None,
    )
    .await;
    plant
}

#[tokio::test]
async fn surfaced_recommendations_meet_threshold_and_are_sorted() {
    let pool = helpers::test_pool().await;
    let plant = seed_struggling_plant(&pool).await;
    let engine = engine(&pool);

    let set = engine
        .generate(plant.id, GenerateOptions::default())
        .await
        .unwrap();

    assert!(!set.recommendations.is_empty());
    assert_eq!(set.total_recommendations, set.recommendations.len());

    for rec in &set.recommendations {
        assert!(
            rec.confidence >= 0.7,
            "recommendation {} below threshold: {}",
            rec.rule,
            rec.confidence
        );
    }

    // Descending by priority weight x confidence
    let weights: Vec<f64> = set
        .recommendations
        .iter()
        .map(|r| r.priority.weight() * r.confidence)
        .collect();
    for pair in weights.windows(2) {
        assert!(pair[0] >= pair[1], "not sorted: {:?}", weights);
    }

    // Overall confidence is the unweighted mean
    let mean = set.recommendations.iter().map(|r| r.confidence).sum::<f64>()
        / set.recommendations.len() as f64;
    assert!((set.confidence - mean).abs() < 1e-9);
}

#[tokio::test]
async fn higher_threshold_filters_more() {
    let pool = helpers::test_pool().await;
    let plant = seed_struggling_plant(&pool).await;
    let engine = engine(&pool);

    let relaxed = engine
        .generate(plant.id, GenerateOptions::default())
        .await
        .unwrap();
    let strict = engine
        .generate(
            plant.id,
            GenerateOptions {
                confidence_threshold: 0.88,
                ..GenerateOptions::default()
            },
        )
        .await
        .unwrap();

    assert!(strict.total_recommendations < relaxed.total_recommendations);
    for rec in &strict.recommendations {
        assert!(rec.confidence >= 0.88);
    }
}

#[tokio::test]
async fn cache_hit_returns_identical_set_without_reevaluation() {
    let pool = helpers::test_pool().await;
    let plant = seed_struggling_plant(&pool).await;
    let engine = engine(&pool);

    let first = engine
        .generate(plant.id, GenerateOptions::default())
        .await
        .unwrap();
    assert_eq!(engine.rule_evaluations(), 1);

    let second = engine
        .generate(plant.id, GenerateOptions::default())
        .await
        .unwrap();
    // No second rule-set evaluation and an identical result
    assert_eq!(engine.rule_evaluations(), 1);
    assert_eq!(second, first);
}

#[tokio::test]
async fn force_refresh_recomputes() {
    let pool = helpers::test_pool().await;
    let plant = seed_struggling_plant(&pool).await;
    let engine = engine(&pool);

    engine
        .generate(plant.id, GenerateOptions::default())
        .await
        .unwrap();
    engine
        .generate(
            plant.id,
            GenerateOptions {
                force_refresh: true,
                ..GenerateOptions::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(engine.rule_evaluations(), 2);
}

#[tokio::test]
async fn clear_plant_cache_invalidates_only_that_plant() {
    let pool = helpers::test_pool().await;
    let plant_a = seed_struggling_plant(&pool).await;
    let plant_b = seed_struggling_plant(&pool).await;
    let engine = engine(&pool);

    engine.generate(plant_a.id, GenerateOptions::default()).await.unwrap();
    engine.generate(plant_b.id, GenerateOptions::default()).await.unwrap();
    assert_eq!(engine.rule_evaluations(), 2);

    engine.clear_plant_cache(plant_a.id);

    // Plant A recomputes, plant B still hits its cache
    engine.generate(plant_a.id, GenerateOptions::default()).await.unwrap();
    assert_eq!(engine.rule_evaluations(), 3);
    engine.generate(plant_b.id, GenerateOptions::default()).await.unwrap();
    assert_eq!(engine.rule_evaluations(), 3);
}

#[tokio::test]
async fn generate_for_unknown_plant_is_not_found() {
    let pool = helpers::test_pool().await;
    let engine = engine(&pool);

    let result = engine.generate(Uuid::new_v4(), GenerateOptions::default()).await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn healthy_plant_yields_empty_set_with_zero_confidence() {
    let pool = helpers::test_pool().await;
    // Mid-vegetative plant in a perfect tent, outside every rule window
    let plant = helpers::seed_plant(&pool, GrowthStage::Vegetative, "Blue Dream", "soil", 10).await;
    helpers::seed_sample_at_optimal(&pool, &plant.tent_id, GrowthStage::Vegetative, 0).await;
    let engine = engine(&pool);

    let set = engine
        .generate(plant.id, GenerateOptions::default())
        .await
        .unwrap();

    assert_eq!(set.total_recommendations, 0);
    assert_eq!(set.confidence, 0.0);
}
