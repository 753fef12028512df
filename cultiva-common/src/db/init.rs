//! Database initialization
//!
//! Opens (or creates) the shared SQLite database and creates any missing
//! tables. Table creation is idempotent, so startup order between services
//! does not matter.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    configure_connection(&pool).await?;
    create_tables(&pool).await?;

    Ok(pool)
}

/// Open an in-memory database with the full schema. Test use only, but kept
/// in the library so integration tests across crates share one setup path.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    configure_connection(&pool).await?;
    create_tables(&pool).await?;
    Ok(pool)
}

async fn configure_connection(pool: &SqlitePool) -> Result<()> {
    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    // WAL allows concurrent readers with one writer, which the scheduler's
    // batch workers rely on
    sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(pool).await?;

    Ok(())
}

/// Create all Cultiva tables (idempotent)
async fn create_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS plants (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            strain TEXT NOT NULL,
            stage TEXT NOT NULL,
            medium TEXT NOT NULL,
            tent_id TEXT NOT NULL,
            planted_at TEXT NOT NULL,
            stage_started_at TEXT NOT NULL,
            archived INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS environment_samples (
            id TEXT PRIMARY KEY,
            tent_id TEXT NOT NULL,
            recorded_at TEXT NOT NULL,
            temperature_c REAL,
            humidity_pct REAL,
            vpd_kpa REAL,
            co2_ppm REAL,
            ppfd_umol REAL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_environment_samples_tent_time \
         ON environment_samples (tent_id, recorded_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS activity_log (
            id TEXT PRIMARY KEY,
            plant_id TEXT NOT NULL,
            recorded_at TEXT NOT NULL,
            activity TEXT NOT NULL,
            value REAL,
            notes TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_activity_log_plant_time \
         ON activity_log (plant_id, recorded_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS analytics_records (
            id TEXT PRIMARY KEY,
            plant_id TEXT NOT NULL,
            calculated_at TEXT NOT NULL,
            yield_prediction_g REAL NOT NULL,
            growth_rate_cm_day REAL NOT NULL,
            efficiency TEXT NOT NULL,
            recommendations TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_analytics_records_plant_time \
         ON analytics_records (plant_id, calculated_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS recommendation_history (
            recommendation_id TEXT PRIMARY KEY,
            plant_id TEXT NOT NULL,
            recommendation TEXT NOT NULL,
            implemented INTEGER NOT NULL,
            effectiveness TEXT,
            notes TEXT,
            outcome TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::debug!("Database tables initialized");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_memory_database_creates_schema() {
        let pool = init_memory_database().await.unwrap();

        // All five tables must exist
        for table in [
            "plants",
            "environment_samples",
            "activity_log",
            "analytics_records",
            "recommendation_history",
        ] {
            let count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
            )
            .bind(table)
            .fetch_one(&pool)
            .await
            .unwrap();
            assert_eq!(count, 1, "missing table {}", table);
        }
    }

    #[tokio::test]
    async fn test_init_database_is_idempotent() {
        let dir = tempfile::TempDir::new().unwrap();
        let db_path = dir.path().join("cultiva.db");

        let pool = init_database(&db_path).await.unwrap();
        drop(pool);

        // Second open against the same file must succeed
        let pool = init_database(&db_path).await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM plants")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
