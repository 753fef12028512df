//! Analytics store integration tests

mod helpers;

use chrono::{Duration, Utc};
use cultiva_common::db::models::GrowthStage;
use cultiva_common::Error;
use cultiva_engine::models::{EmbeddedRecommendation, NewAnalyticsRecord};
use cultiva_engine::AnalyticsStore;
use std::collections::HashMap;
use uuid::Uuid;

fn new_record(plant_id: Uuid, yield_g: f64, growth: f64) -> NewAnalyticsRecord {
    NewAnalyticsRecord {
        plant_id,
        calculated_at: Utc::now(),
        yield_prediction_g: yield_g,
        growth_rate_cm_day: growth,
        efficiency: HashMap::from([
            ("temperature".to_string(), 0.8),
            ("humidity".to_string(), 0.7),
            ("vpd".to_string(), 0.9),
            ("light".to_string(), 0.6),
            ("co2".to_string(), 0.5),
        ]),
        recommendations: Vec::new(),
    }
}

#[tokio::test]
async fn create_rejects_out_of_range_listing_every_field() {
    let pool = helpers::test_pool().await;
    let plant = helpers::seed_plant(&pool, GrowthStage::Vegetative, "Blue Dream", "soil", 10).await;
    let store = AnalyticsStore::new(pool.clone());

    // Both fields out of range: both must be reported
    let result = store.create(new_record(plant.id, 5000.0, -1.0)).await;
    match result {
        Err(Error::Validation { fields }) => {
            assert_eq!(fields.len(), 2);
            assert!(fields.iter().any(|f| f.contains("yield_prediction_g")));
            assert!(fields.iter().any(|f| f.contains("growth_rate_cm_day")));
        }
        other => panic!("Expected validation error, got {:?}", other),
    }

    // Nothing was persisted
    assert!(store.get_latest(plant.id).await.unwrap().is_none());
}

#[tokio::test]
async fn create_coerces_subscores_into_canonical_shape() {
    let pool = helpers::test_pool().await;
    let plant = helpers::seed_plant(&pool, GrowthStage::Vegetative, "Blue Dream", "soil", 10).await;
    let store = AnalyticsStore::new(pool.clone());

    let mut new = new_record(plant.id, 400.0, 2.0);
    new.efficiency = HashMap::from([
        ("temperature".to_string(), 0.9),
        ("vpd".to_string(), 1.5),          // clamped to 1.0
        ("moon_phase".to_string(), 0.3),   // unknown key dropped
    ]);

    let record = store.create(new).await.unwrap();
    assert_eq!(record.efficiency.temperature, 0.9);
    assert_eq!(record.efficiency.vpd, 1.0);
    assert_eq!(record.efficiency.humidity, 0.0); // missing key defaulted
    assert_eq!(record.efficiency.light, 0.0);
    assert_eq!(record.efficiency.co2, 0.0);

    // Overall is the fixed weighted sum of the coerced sub-scores
    let expected_overall = 0.25 * 0.9 + 0.30 * 1.0;
    assert!((record.efficiency.overall_score - expected_overall).abs() < 1e-9);
}

#[tokio::test]
async fn create_filters_malformed_recommendations_without_failing() {
    let pool = helpers::test_pool().await;
    let plant = helpers::seed_plant(&pool, GrowthStage::Vegetative, "Blue Dream", "soil", 10).await;
    let store = AnalyticsStore::new(pool.clone());

    let mut new = new_record(plant.id, 400.0, 2.0);
    new.recommendations = vec![
        EmbeddedRecommendation {
            rec_type: "environment".to_string(),
            message: "Lower the tent temperature a degree".to_string(),
        },
        EmbeddedRecommendation {
            rec_type: String::new(),
            message: "typeless".to_string(),
        },
        EmbeddedRecommendation {
            rec_type: "growth".to_string(),
            message: "y".repeat(600),
        },
    ];

    let record = store.create(new).await.unwrap();
    assert_eq!(record.recommendations.len(), 1);
    assert_eq!(record.recommendations[0].rec_type, "environment");

    // The filtered shape is what round-trips from the database
    let loaded = store.get_latest(plant.id).await.unwrap().unwrap();
    assert_eq!(loaded.recommendations, record.recommendations);
}

#[tokio::test]
async fn latest_is_most_recent_by_calculation_timestamp() {
    let pool = helpers::test_pool().await;
    let plant = helpers::seed_plant(&pool, GrowthStage::Vegetative, "Blue Dream", "soil", 10).await;
    let store = AnalyticsStore::new(pool.clone());

    let mut old = new_record(plant.id, 300.0, 1.0);
    old.calculated_at = Utc::now() - Duration::days(3);
    store.create(old).await.unwrap();

    let recent = store.create(new_record(plant.id, 500.0, 2.5)).await.unwrap();

    let latest = store.get_latest(plant.id).await.unwrap().unwrap();
    assert_eq!(latest.id, recent.id);
    assert!((latest.yield_prediction_g - 500.0).abs() < 1e-9);

    // Full listing is newest first and respects the limit
    let all = store.get_by_plant_id(plant.id, 10).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, recent.id);
    let limited = store.get_by_plant_id(plant.id, 1).await.unwrap();
    assert_eq!(limited.len(), 1);
}

#[tokio::test]
async fn trends_return_three_parallel_series() {
    let pool = helpers::test_pool().await;
    let plant = helpers::seed_plant(&pool, GrowthStage::Vegetative, "Blue Dream", "soil", 10).await;
    let store = AnalyticsStore::new(pool.clone());

    for (days_ago, yield_g) in [(10i64, 300.0), (5, 350.0), (1, 420.0)] {
        let mut new = new_record(plant.id, yield_g, 2.0);
        new.calculated_at = Utc::now() - Duration::days(days_ago);
        store.create(new).await.unwrap();
    }

    let trends = store.get_trends(plant.id, 30).await.unwrap();
    assert_eq!(trends.yield_trend.len(), 3);
    assert_eq!(trends.growth_trend.len(), 3);
    assert_eq!(trends.efficiency_trend.len(), 3);

    // Raw points, oldest first, no interpolation
    assert!((trends.yield_trend[0].value - 300.0).abs() < 1e-9);
    assert!((trends.yield_trend[2].value - 420.0).abs() < 1e-9);
    assert!(trends.yield_trend[0].timestamp < trends.yield_trend[2].timestamp);

    // Window cutoff excludes older records
    let trends = store.get_trends(plant.id, 7).await.unwrap();
    assert_eq!(trends.yield_trend.len(), 2);
}

#[tokio::test]
async fn delete_by_plant_id_removes_all_records() {
    let pool = helpers::test_pool().await;
    let plant = helpers::seed_plant(&pool, GrowthStage::Vegetative, "Blue Dream", "soil", 10).await;
    let store = AnalyticsStore::new(pool.clone());

    store.create(new_record(plant.id, 400.0, 2.0)).await.unwrap();
    store.create(new_record(plant.id, 410.0, 2.1)).await.unwrap();

    let deleted = store.delete_by_plant_id(plant.id).await.unwrap();
    assert_eq!(deleted, 2);
    assert!(store.get_latest(plant.id).await.unwrap().is_none());
}
