//! Activity log table access (externally owned, append-only)

use chrono::{DateTime, Utc};
use cultiva_common::db::models::{ActivityLogEntry, ActivityType};
use cultiva_common::{time, Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

fn entry_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<ActivityLogEntry> {
    let id_str: String = row.get("id");
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| Error::Internal(format!("Failed to parse activity id: {}", e)))?;
    let plant_id_str: String = row.get("plant_id");
    let plant_id = Uuid::parse_str(&plant_id_str)
        .map_err(|e| Error::Internal(format!("Failed to parse plant id: {}", e)))?;
    let activity_str: String = row.get("activity");
    let activity = ActivityType::parse(&activity_str)
        .ok_or_else(|| Error::Internal(format!("Unknown activity type '{}'", activity_str)))?;
    let recorded_at: String = row.get("recorded_at");

    Ok(ActivityLogEntry {
        id,
        plant_id,
        recorded_at: time::parse_rfc3339(&recorded_at)?,
        activity,
        value: row.get("value"),
        notes: row.get("notes"),
    })
}

/// Load activity entries for a plant in [from, to], oldest first
pub async fn load_range(
    pool: &SqlitePool,
    plant_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<ActivityLogEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT id, plant_id, recorded_at, activity, value, notes
        FROM activity_log
        WHERE plant_id = ? AND recorded_at >= ? AND recorded_at <= ?
        ORDER BY recorded_at
        "#,
    )
    .bind(plant_id.to_string())
    .bind(from.to_rfc3339())
    .bind(to.to_rfc3339())
    .fetch_all(pool)
    .await?;

    rows.iter().map(entry_from_row).collect()
}

/// Insert an activity entry. Seeding/test helper; ingestion owns this table.
pub async fn insert_entry(pool: &SqlitePool, entry: &ActivityLogEntry) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO activity_log (id, plant_id, recorded_at, activity, value, notes)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(entry.id.to_string())
    .bind(entry.plant_id.to_string())
    .bind(entry.recorded_at.to_rfc3339())
    .bind(entry.activity.as_str())
    .bind(entry.value)
    .bind(&entry.notes)
    .execute(pool)
    .await?;
    Ok(())
}
