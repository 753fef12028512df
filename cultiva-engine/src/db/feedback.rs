//! Recommendation history table access (append-then-update, one row per
//! recommendation id)

use cultiva_common::{time, Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{Effectiveness, FeedbackStats, Recommendation, RecommendationHistoryEntry};

fn entry_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<RecommendationHistoryEntry> {
    let rec_id_str: String = row.get("recommendation_id");
    let recommendation_id = Uuid::parse_str(&rec_id_str)
        .map_err(|e| Error::Internal(format!("Failed to parse recommendation id: {}", e)))?;
    let plant_id_str: String = row.get("plant_id");
    let plant_id = Uuid::parse_str(&plant_id_str)
        .map_err(|e| Error::Internal(format!("Failed to parse plant id: {}", e)))?;

    let recommendation_json: String = row.get("recommendation");
    let recommendation: Recommendation = serde_json::from_str(&recommendation_json)
        .map_err(|e| Error::Internal(format!("Failed to deserialize recommendation: {}", e)))?;

    let effectiveness: Option<String> = row.get("effectiveness");
    let effectiveness = effectiveness.as_deref().and_then(Effectiveness::parse);

    let outcome: Option<String> = row.get("outcome");
    let outcome = outcome
        .map(|s| serde_json::from_str(&s))
        .transpose()
        .map_err(|e| Error::Internal(format!("Failed to deserialize outcome: {}", e)))?;

    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(RecommendationHistoryEntry {
        recommendation_id,
        plant_id,
        recommendation,
        implemented: row.get::<i64, _>("implemented") != 0,
        effectiveness,
        notes: row.get("notes"),
        outcome,
        created_at: time::parse_rfc3339(&created_at)?,
        updated_at: time::parse_rfc3339(&updated_at)?,
    })
}

/// Create the history row on first feedback, update it on later feedback.
/// The recommendation snapshot and created_at survive updates.
pub async fn upsert_entry(pool: &SqlitePool, entry: &RecommendationHistoryEntry) -> Result<()> {
    let recommendation = serde_json::to_string(&entry.recommendation)
        .map_err(|e| Error::Internal(format!("Failed to serialize recommendation: {}", e)))?;
    let outcome = entry
        .outcome
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| Error::Internal(format!("Failed to serialize outcome: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO recommendation_history (
            recommendation_id, plant_id, recommendation,
            implemented, effectiveness, notes, outcome,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(recommendation_id) DO UPDATE SET
            implemented = excluded.implemented,
            effectiveness = excluded.effectiveness,
            notes = excluded.notes,
            outcome = excluded.outcome,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(entry.recommendation_id.to_string())
    .bind(entry.plant_id.to_string())
    .bind(recommendation)
    .bind(entry.implemented as i64)
    .bind(entry.effectiveness.map(|e| e.as_str()))
    .bind(&entry.notes)
    .bind(outcome)
    .bind(entry.created_at.to_rfc3339())
    .bind(entry.updated_at.to_rfc3339())
    .execute(pool)
    .await?;
    Ok(())
}

/// Load one history entry by recommendation id
pub async fn get_entry(
    pool: &SqlitePool,
    recommendation_id: Uuid,
) -> Result<Option<RecommendationHistoryEntry>> {
    let row = sqlx::query(
        r#"
        SELECT recommendation_id, plant_id, recommendation,
               implemented, effectiveness, notes, outcome, created_at, updated_at
        FROM recommendation_history
        WHERE recommendation_id = ?
        "#,
    )
    .bind(recommendation_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(entry_from_row).transpose()
}

/// All history entries for a plant, newest first
pub async fn list_for_plant(
    pool: &SqlitePool,
    plant_id: Uuid,
) -> Result<Vec<RecommendationHistoryEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT recommendation_id, plant_id, recommendation,
               implemented, effectiveness, notes, outcome, created_at, updated_at
        FROM recommendation_history
        WHERE plant_id = ?
        ORDER BY updated_at DESC
        "#,
    )
    .bind(plant_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(entry_from_row).collect()
}

/// Aggregate feedback statistics for a plant
pub async fn stats(pool: &SqlitePool, plant_id: Uuid) -> Result<FeedbackStats> {
    let row = sqlx::query(
        r#"
        SELECT
            COUNT(*) AS total,
            COALESCE(SUM(implemented), 0) AS implemented,
            COALESCE(SUM(CASE WHEN effectiveness = 'positive' THEN 1 ELSE 0 END), 0) AS positive,
            COALESCE(SUM(CASE WHEN effectiveness = 'neutral' THEN 1 ELSE 0 END), 0) AS neutral,
            COALESCE(SUM(CASE WHEN effectiveness = 'negative' THEN 1 ELSE 0 END), 0) AS negative
        FROM recommendation_history
        WHERE plant_id = ?
        "#,
    )
    .bind(plant_id.to_string())
    .fetch_one(pool)
    .await?;

    let total: i64 = row.get("total");
    let implemented: i64 = row.get("implemented");
    let implementation_rate = if total > 0 {
        implemented as f64 / total as f64
    } else {
        0.0
    };

    Ok(FeedbackStats {
        total,
        implemented,
        positive: row.get("positive"),
        neutral: row.get("neutral"),
        negative: row.get("negative"),
        implementation_rate,
    })
}
