//! Analytics record table access

use chrono::{DateTime, Utc};
use cultiva_common::{time, Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{AnalyticsRecord, EmbeddedRecommendation, EnvironmentalEfficiency, TrendPoint, TrendSeries};

fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<AnalyticsRecord> {
    let id_str: String = row.get("id");
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| Error::Internal(format!("Failed to parse record id: {}", e)))?;
    let plant_id_str: String = row.get("plant_id");
    let plant_id = Uuid::parse_str(&plant_id_str)
        .map_err(|e| Error::Internal(format!("Failed to parse plant id: {}", e)))?;

    let efficiency_json: String = row.get("efficiency");
    let efficiency: EnvironmentalEfficiency = serde_json::from_str(&efficiency_json)
        .map_err(|e| Error::Internal(format!("Failed to deserialize efficiency: {}", e)))?;

    let recommendations_json: String = row.get("recommendations");
    let recommendations: Vec<EmbeddedRecommendation> = serde_json::from_str(&recommendations_json)
        .map_err(|e| Error::Internal(format!("Failed to deserialize recommendations: {}", e)))?;

    let calculated_at: String = row.get("calculated_at");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(AnalyticsRecord {
        id,
        plant_id,
        calculated_at: time::parse_rfc3339(&calculated_at)?,
        yield_prediction_g: row.get("yield_prediction_g"),
        growth_rate_cm_day: row.get("growth_rate_cm_day"),
        efficiency,
        recommendations,
        created_at: time::parse_rfc3339(&created_at)?,
        updated_at: time::parse_rfc3339(&updated_at)?,
    })
}

/// Persist a validated analytics record
pub async fn insert_record(pool: &SqlitePool, record: &AnalyticsRecord) -> Result<()> {
    // Serialize nested payloads before touching the pool
    let efficiency = serde_json::to_string(&record.efficiency)
        .map_err(|e| Error::Internal(format!("Failed to serialize efficiency: {}", e)))?;
    let recommendations = serde_json::to_string(&record.recommendations)
        .map_err(|e| Error::Internal(format!("Failed to serialize recommendations: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO analytics_records (
            id, plant_id, calculated_at,
            yield_prediction_g, growth_rate_cm_day,
            efficiency, recommendations, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.id.to_string())
    .bind(record.plant_id.to_string())
    .bind(record.calculated_at.to_rfc3339())
    .bind(record.yield_prediction_g)
    .bind(record.growth_rate_cm_day)
    .bind(efficiency)
    .bind(recommendations)
    .bind(record.created_at.to_rfc3339())
    .bind(record.updated_at.to_rfc3339())
    .execute(pool)
    .await?;
    Ok(())
}

/// Most recent record for a plant by calculation timestamp
pub async fn latest_for_plant(pool: &SqlitePool, plant_id: Uuid) -> Result<Option<AnalyticsRecord>> {
    let row = sqlx::query(
        r#"
        SELECT id, plant_id, calculated_at, yield_prediction_g, growth_rate_cm_day,
               efficiency, recommendations, created_at, updated_at
        FROM analytics_records
        WHERE plant_id = ?
        ORDER BY calculated_at DESC
        LIMIT 1
        "#,
    )
    .bind(plant_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(record_from_row).transpose()
}

/// Records for a plant, newest first, up to `limit`
pub async fn list_for_plant(
    pool: &SqlitePool,
    plant_id: Uuid,
    limit: i64,
) -> Result<Vec<AnalyticsRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT id, plant_id, calculated_at, yield_prediction_g, growth_rate_cm_day,
               efficiency, recommendations, created_at, updated_at
        FROM analytics_records
        WHERE plant_id = ?
        ORDER BY calculated_at DESC
        LIMIT ?
        "#,
    )
    .bind(plant_id.to_string())
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(record_from_row).collect()
}

/// Three parallel raw time series for the trend charts, oldest first
pub async fn trends(pool: &SqlitePool, plant_id: Uuid, days: i64) -> Result<TrendSeries> {
    let cutoff = (time::now() - chrono::Duration::days(days)).to_rfc3339();
    let rows = sqlx::query(
        r#"
        SELECT calculated_at, yield_prediction_g, growth_rate_cm_day, efficiency
        FROM analytics_records
        WHERE plant_id = ? AND calculated_at >= ?
        ORDER BY calculated_at
        "#,
    )
    .bind(plant_id.to_string())
    .bind(cutoff)
    .fetch_all(pool)
    .await?;

    let mut series = TrendSeries {
        yield_trend: Vec::with_capacity(rows.len()),
        growth_trend: Vec::with_capacity(rows.len()),
        efficiency_trend: Vec::with_capacity(rows.len()),
    };

    for row in rows {
        let calculated_at: String = row.get("calculated_at");
        let timestamp = time::parse_rfc3339(&calculated_at)?;
        let efficiency_json: String = row.get("efficiency");
        let efficiency: EnvironmentalEfficiency = serde_json::from_str(&efficiency_json)
            .map_err(|e| Error::Internal(format!("Failed to deserialize efficiency: {}", e)))?;

        series.yield_trend.push(TrendPoint {
            timestamp,
            value: row.get("yield_prediction_g"),
        });
        series.growth_trend.push(TrendPoint {
            timestamp,
            value: row.get("growth_rate_cm_day"),
        });
        series.efficiency_trend.push(TrendPoint {
            timestamp,
            value: efficiency.overall_score,
        });
    }

    Ok(series)
}

/// Delete every record for a plant. Returns deleted row count.
pub async fn delete_for_plant(pool: &SqlitePool, plant_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM analytics_records WHERE plant_id = ?")
        .bind(plant_id.to_string())
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Delete records calculated before the cutoff. Returns deleted row count.
pub async fn delete_older_than(pool: &SqlitePool, cutoff: DateTime<Utc>) -> Result<u64> {
    let result = sqlx::query("DELETE FROM analytics_records WHERE calculated_at < ?")
        .bind(cutoff.to_rfc3339())
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Delete records whose plant no longer exists. Returns deleted row count.
pub async fn delete_orphans(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM analytics_records
        WHERE plant_id NOT IN (SELECT id FROM plants)
        "#,
    )
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
