//! Plant table access (externally owned; the engine reads it)

use cultiva_common::db::models::{GrowthStage, Plant};
use cultiva_common::{time, Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Minimal listing row for scheduler batches
#[derive(Debug, Clone)]
pub struct ActivePlant {
    pub id: Uuid,
    pub stage: GrowthStage,
}

fn plant_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Plant> {
    let id_str: String = row.get("id");
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| Error::Internal(format!("Failed to parse plant id: {}", e)))?;

    let stage_str: String = row.get("stage");
    let stage = GrowthStage::parse(&stage_str)
        .ok_or_else(|| Error::Internal(format!("Unknown growth stage '{}'", stage_str)))?;

    let planted_at: String = row.get("planted_at");
    let stage_started_at: String = row.get("stage_started_at");

    Ok(Plant {
        id,
        name: row.get("name"),
        strain: row.get("strain"),
        stage,
        medium: row.get("medium"),
        tent_id: row.get("tent_id"),
        planted_at: time::parse_rfc3339(&planted_at)?,
        stage_started_at: time::parse_rfc3339(&stage_started_at)?,
        archived: row.get::<i64, _>("archived") != 0,
    })
}

/// Load a plant by id. Returns `Error::NotFound` when no row exists.
pub async fn get_plant(pool: &SqlitePool, plant_id: Uuid) -> Result<Plant> {
    let row = sqlx::query(
        r#"
        SELECT id, name, strain, stage, medium, tent_id,
               planted_at, stage_started_at, archived
        FROM plants
        WHERE id = ?
        "#,
    )
    .bind(plant_id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => plant_from_row(&row),
        None => Err(Error::NotFound(format!("plant {}", plant_id))),
    }
}

/// List all plants eligible for scheduled processing: not archived and not
/// in a terminal stage.
pub async fn list_active(pool: &SqlitePool) -> Result<Vec<ActivePlant>> {
    let rows = sqlx::query(
        r#"
        SELECT id, stage
        FROM plants
        WHERE archived = 0 AND stage != 'harvest'
        ORDER BY planted_at
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut plants = Vec::with_capacity(rows.len());
    for row in rows {
        let id_str: String = row.get("id");
        let id = Uuid::parse_str(&id_str)
            .map_err(|e| Error::Internal(format!("Failed to parse plant id: {}", e)))?;
        let stage_str: String = row.get("stage");
        let stage = GrowthStage::parse(&stage_str)
            .ok_or_else(|| Error::Internal(format!("Unknown growth stage '{}'", stage_str)))?;
        plants.push(ActivePlant { id, stage });
    }
    Ok(plants)
}

/// Count active plants with no analytics record in the last `hours` hours.
/// Used by the hourly health probe as a staleness signal.
pub async fn count_stale_active(pool: &SqlitePool, hours: i64) -> Result<i64> {
    let cutoff = (time::now() - chrono::Duration::hours(hours)).to_rfc3339();
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM plants p
        WHERE p.archived = 0
          AND p.stage != 'harvest'
          AND NOT EXISTS (
              SELECT 1 FROM analytics_records a
              WHERE a.plant_id = p.id AND a.calculated_at >= ?
          )
        "#,
    )
    .bind(cutoff)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Insert a plant row. The ingestion service owns this table in production;
/// this helper exists for seeding tools and tests.
pub async fn insert_plant(pool: &SqlitePool, plant: &Plant) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO plants (
            id, name, strain, stage, medium, tent_id,
            planted_at, stage_started_at, archived
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(plant.id.to_string())
    .bind(&plant.name)
    .bind(&plant.strain)
    .bind(plant.stage.as_str())
    .bind(&plant.medium)
    .bind(&plant.tent_id)
    .bind(plant.planted_at.to_rfc3339())
    .bind(plant.stage_started_at.to_rfc3339())
    .bind(plant.archived as i64)
    .execute(pool)
    .await?;
    Ok(())
}

/// Delete a plant row. Seeding/test helper, mirrors `insert_plant`.
pub async fn delete_plant(pool: &SqlitePool, plant_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM plants WHERE id = ?")
        .bind(plant_id.to_string())
        .execute(pool)
        .await?;
    Ok(())
}
