//! Shared test fixtures: in-memory database and seed helpers
#![allow(dead_code)]

use chrono::{Duration, Utc};
use cultiva_common::db::models::{
    ActivityLogEntry, ActivityType, EnvironmentSample, GrowthStage, Plant,
};
use cultiva_engine::db;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Fresh in-memory database with the full schema
pub async fn test_pool() -> SqlitePool {
    cultiva_common::db::init::init_memory_database()
        .await
        .expect("in-memory database")
}

/// Seed a plant in the given stage, `days_in_stage` days into it
pub async fn seed_plant(
    pool: &SqlitePool,
    stage: GrowthStage,
    strain: &str,
    medium: &str,
    days_in_stage: i64,
) -> Plant {
    let now = Utc::now();
    let plant = Plant {
        id: Uuid::new_v4(),
        name: format!("{} #1", strain),
        strain: strain.to_string(),
        stage,
        medium: medium.to_string(),
        tent_id: format!("tent-{}", Uuid::new_v4()),
        planted_at: now - Duration::days(days_in_stage + 30),
        stage_started_at: now - Duration::days(days_in_stage),
        archived: false,
    };
    db::plants::insert_plant(pool, &plant).await.expect("seed plant");
    plant
}

/// Seed one environment sample with explicit readings, `days_ago` days back
pub async fn seed_sample(
    pool: &SqlitePool,
    tent_id: &str,
    days_ago: i64,
    temperature_c: Option<f64>,
    humidity_pct: Option<f64>,
    vpd_kpa: Option<f64>,
    co2_ppm: Option<f64>,
    ppfd_umol: Option<f64>,
) -> EnvironmentSample {
    let sample = EnvironmentSample {
        id: Uuid::new_v4(),
        tent_id: tent_id.to_string(),
        recorded_at: Utc::now() - Duration::days(days_ago),
        temperature_c,
        humidity_pct,
        vpd_kpa,
        co2_ppm,
        ppfd_umol,
    };
    db::samples::insert_sample(pool, &sample).await.expect("seed sample");
    sample
}

/// Seed a sample with every reading exactly at the stage's optimal midpoint
pub async fn seed_sample_at_optimal(
    pool: &SqlitePool,
    tent_id: &str,
    stage: GrowthStage,
    days_ago: i64,
) -> EnvironmentSample {
    use cultiva_engine::metrics::efficiency::{optimal_range, Dimension};
    seed_sample(
        pool,
        tent_id,
        days_ago,
        Some(optimal_range(stage, Dimension::Temperature).optimal),
        Some(optimal_range(stage, Dimension::Humidity).optimal),
        Some(optimal_range(stage, Dimension::Vpd).optimal),
        Some(optimal_range(stage, Dimension::Co2).optimal),
        Some(optimal_range(stage, Dimension::Light).optimal),
    )
    .await
}

/// Seed a height measurement on the activity log
pub async fn seed_measurement(
    pool: &SqlitePool,
    plant_id: Uuid,
    days_ago: i64,
    height_cm: f64,
) -> ActivityLogEntry {
    let entry = ActivityLogEntry {
        id: Uuid::new_v4(),
        plant_id,
        recorded_at: Utc::now() - Duration::days(days_ago),
        activity: ActivityType::Measurement,
        value: Some(height_cm),
        notes: None,
    };
    db::activity::insert_entry(pool, &entry).await.expect("seed measurement");
    entry
}
