//! cultiva-engine - Cultivation Analytics Daemon
//!
//! Keeps analytics records fresh for all active plants and runs the
//! retention and health jobs. On-demand computation (recommendations,
//! trends) is served through the library interface by the routing layer.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cultiva_common::config::{resolve_data_folder, EngineConfig};
use cultiva_common::events::EventBus;
use cultiva_engine::{AnalyticsEngine, AnalyticsScheduler, SchedulerConfig};

#[derive(Parser, Debug)]
#[command(name = "cultiva-engine", about = "Cultivation analytics daemon")]
struct Args {
    /// Data folder holding the shared database (overrides env and config)
    #[arg(long)]
    data_folder: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting cultiva-engine");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let data_folder = resolve_data_folder(args.data_folder.as_deref(), "CULTIVA_DATA_FOLDER");
    let db_path = data_folder.join("cultiva.db");
    info!("Database: {}", db_path.display());

    let db_pool = cultiva_common::db::init_database(&db_path).await?;
    info!("Database connection established");

    let engine_config = EngineConfig::load();
    let event_bus = EventBus::new(100);

    let engine = AnalyticsEngine::new(db_pool.clone(), event_bus.clone());
    let scheduler = Arc::new(AnalyticsScheduler::new(
        db_pool,
        engine,
        event_bus,
        SchedulerConfig::from_engine_config(&engine_config),
    ));

    Arc::clone(&scheduler).start();
    info!("Scheduler running; press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    scheduler.stop();
    info!("Scheduler stopped");

    Ok(())
}
