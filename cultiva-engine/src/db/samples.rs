//! Environment sample table access (externally owned, append-only)

use chrono::{DateTime, Utc};
use cultiva_common::db::models::EnvironmentSample;
use cultiva_common::{time, Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

fn sample_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<EnvironmentSample> {
    let id_str: String = row.get("id");
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| Error::Internal(format!("Failed to parse sample id: {}", e)))?;
    let recorded_at: String = row.get("recorded_at");

    Ok(EnvironmentSample {
        id,
        tent_id: row.get("tent_id"),
        recorded_at: time::parse_rfc3339(&recorded_at)?,
        temperature_c: row.get("temperature_c"),
        humidity_pct: row.get("humidity_pct"),
        vpd_kpa: row.get("vpd_kpa"),
        co2_ppm: row.get("co2_ppm"),
        ppfd_umol: row.get("ppfd_umol"),
    })
}

/// Load samples for a tent in [from, to], oldest first
pub async fn load_range(
    pool: &SqlitePool,
    tent_id: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<EnvironmentSample>> {
    let rows = sqlx::query(
        r#"
        SELECT id, tent_id, recorded_at,
               temperature_c, humidity_pct, vpd_kpa, co2_ppm, ppfd_umol
        FROM environment_samples
        WHERE tent_id = ? AND recorded_at >= ? AND recorded_at <= ?
        ORDER BY recorded_at
        "#,
    )
    .bind(tent_id)
    .bind(from.to_rfc3339())
    .bind(to.to_rfc3339())
    .fetch_all(pool)
    .await?;

    rows.iter().map(sample_from_row).collect()
}

/// Most recent sample for a tent, if any
pub async fn latest_for_tent(pool: &SqlitePool, tent_id: &str) -> Result<Option<EnvironmentSample>> {
    let row = sqlx::query(
        r#"
        SELECT id, tent_id, recorded_at,
               temperature_c, humidity_pct, vpd_kpa, co2_ppm, ppfd_umol
        FROM environment_samples
        WHERE tent_id = ?
        ORDER BY recorded_at DESC
        LIMIT 1
        "#,
    )
    .bind(tent_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(sample_from_row).transpose()
}

/// Insert a sample row. Seeding/test helper; ingestion owns this table.
pub async fn insert_sample(pool: &SqlitePool, sample: &EnvironmentSample) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO environment_samples (
            id, tent_id, recorded_at,
            temperature_c, humidity_pct, vpd_kpa, co2_ppm, ppfd_umol
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(sample.id.to_string())
    .bind(&sample.tent_id)
    .bind(sample.recorded_at.to_rfc3339())
    .bind(sample.temperature_c)
    .bind(sample.humidity_pct)
    .bind(sample.vpd_kpa)
    .bind(sample.co2_ppm)
    .bind(sample.ppfd_umol)
    .execute(pool)
    .await?;
    Ok(())
}
