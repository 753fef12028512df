//! Background scheduler
//!
//! Three independent periodic jobs on one timer-driven scheduler:
//! - batch analytics recomputation over all active plants (bounded
//!   concurrency, per-plant failure isolation)
//! - daily retention and orphan sweep
//! - hourly health probe
//!
//! Start/stop are idempotent. Stopping cancels the job timers and clears
//! the registry; batch items already in flight are allowed to finish.

use futures::stream::{self, StreamExt};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use cultiva_common::config::EngineConfig;
use cultiva_common::events::{CultivaEvent, EventBus};
use cultiva_common::{time, Result};
use sqlx::SqlitePool;

use crate::db;
use crate::engine::{AnalyticsEngine, ProcessOptions};
use crate::store::AnalyticsStore;

/// Scheduler timing and sizing
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Cadence of the batch analytics job
    pub batch_interval: Duration,
    /// Cadence of the retention/orphan sweep
    pub retention_interval: Duration,
    /// Cadence of the health probe
    pub health_interval: Duration,
    /// Concurrent plants per batch
    pub batch_size: usize,
    /// Analytics record retention window in days
    pub retention_days: i64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_interval: Duration::from_secs(6 * 60 * 60),
            retention_interval: Duration::from_secs(24 * 60 * 60),
            health_interval: Duration::from_secs(60 * 60),
            batch_size: 5,
            retention_days: 90,
        }
    }
}

impl SchedulerConfig {
    /// Derive scheduler timing from the engine configuration
    pub fn from_engine_config(config: &EngineConfig) -> Self {
        Self {
            batch_interval: Duration::from_secs(config.batch_interval_hours * 60 * 60),
            batch_size: config.batch_size.max(1),
            retention_days: config.retention_days,
            ..Self::default()
        }
    }
}

/// Counters from one batch cycle. One plant's failure never aborts the
/// batch; it is counted here instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.errors
    }
}

/// Snapshot of the scheduler's job registry
#[derive(Debug, Clone)]
pub struct SchedulerStatus {
    pub is_running: bool,
    pub active_jobs: Vec<String>,
    pub job_count: usize,
}

struct ActiveJobs {
    token: CancellationToken,
    names: Vec<&'static str>,
    // Held so the registry owns its tasks; dropped (not aborted) on stop
    #[allow(dead_code)]
    handles: Vec<JoinHandle<()>>,
}

/// Periodic driver for the analytics engine
pub struct AnalyticsScheduler {
    db: SqlitePool,
    engine: AnalyticsEngine,
    store: AnalyticsStore,
    event_bus: EventBus,
    config: SchedulerConfig,
    jobs: Mutex<Option<ActiveJobs>>,
}

impl AnalyticsScheduler {
    pub fn new(
        db: SqlitePool,
        engine: AnalyticsEngine,
        event_bus: EventBus,
        config: SchedulerConfig,
    ) -> Self {
        let store = engine.store().clone();
        Self {
            db,
            engine,
            store,
            event_bus,
            config,
            jobs: Mutex::new(None),
        }
    }

    /// Start the periodic jobs. Calling start on a running scheduler logs
    /// and no-ops.
    pub fn start(self: Arc<Self>) {
        let mut jobs = self.jobs.lock().expect("scheduler mutex poisoned");
        if jobs.is_some() {
            tracing::info!("Scheduler already running, start ignored");
            return;
        }

        tracing::info!(
            batch_interval_secs = self.config.batch_interval.as_secs(),
            batch_size = self.config.batch_size,
            retention_days = self.config.retention_days,
            "Starting analytics scheduler"
        );

        let token = CancellationToken::new();
        let mut handles = Vec::with_capacity(3);

        // Batch analytics job
        {
            let scheduler = Arc::clone(&self);
            let token = token.clone();
            let period = self.config.batch_interval;
            handles.push(tokio::spawn(async move {
                let mut timer = interval(period);
                timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = timer.tick() => {
                            match scheduler.run_batch_cycle().await {
                                Ok(summary) => tracing::info!(
                                    processed = summary.processed,
                                    skipped = summary.skipped,
                                    errors = summary.errors,
                                    "Scheduled analytics cycle completed"
                                ),
                                Err(e) => tracing::error!("Scheduled analytics cycle failed: {}", e),
                            }
                        }
                    }
                }
            }));
        }

        // Retention/orphan sweep
        {
            let scheduler = Arc::clone(&self);
            let token = token.clone();
            let period = self.config.retention_interval;
            handles.push(tokio::spawn(async move {
                let mut timer = interval(period);
                timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = timer.tick() => {
                            if let Err(e) = scheduler.run_retention_sweep().await {
                                tracing::error!("Retention sweep failed: {}", e);
                            }
                        }
                    }
                }
            }));
        }

        // Health probe
        {
            let scheduler = Arc::clone(&self);
            let token = token.clone();
            let period = self.config.health_interval;
            handles.push(tokio::spawn(async move {
                let mut timer = interval(period);
                timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = timer.tick() => {
                            if let Err(e) = scheduler.run_health_probe().await {
                                tracing::error!("Health probe failed: {}", e);
                            }
                        }
                    }
                }
            }));
        }

        *jobs = Some(ActiveJobs {
            token,
            names: vec!["analytics_batch", "retention_sweep", "health_probe"],
            handles,
        });
    }

    /// Stop all periodic jobs and clear the registry. In-flight batch
    /// items finish; only new firings are prevented.
    pub fn stop(&self) {
        let taken = self.jobs.lock().expect("scheduler mutex poisoned").take();
        match taken {
            Some(active) => {
                active.token.cancel();
                tracing::info!("Scheduler stopped, {} jobs cancelled", active.names.len());
            }
            None => tracing::debug!("Scheduler stop ignored, not running"),
        }
    }

    /// Current registry snapshot
    pub fn status(&self) -> SchedulerStatus {
        let jobs = self.jobs.lock().expect("scheduler mutex poisoned");
        match jobs.as_ref() {
            Some(active) => SchedulerStatus {
                is_running: true,
                active_jobs: active.names.iter().map(|n| n.to_string()).collect(),
                job_count: active.names.len(),
            },
            None => SchedulerStatus {
                is_running: false,
                active_jobs: Vec::new(),
                job_count: 0,
            },
        }
    }

    /// Run the batch cycle immediately, outside the cadence. Same
    /// semantics as the scheduled run: plants with fresh records are
    /// skipped cheaply.
    pub async fn force_process_all_plants(&self) -> Result<BatchSummary> {
        self.run_batch_cycle().await
    }

    /// One full cycle over all active plants
    pub async fn run_batch_cycle(&self) -> Result<BatchSummary> {
        let plants = db::plants::list_active(&self.db).await?;
        let ids: Vec<Uuid> = plants.iter().map(|p| p.id).collect();
        tracing::debug!(plants = ids.len(), "Starting analytics batch cycle");
        Ok(self.process_plants(&ids).await)
    }

    /// Process a set of plants with bounded concurrency. Each plant is an
    /// independent unit of work; failures are counted, not propagated.
    pub async fn process_plants(&self, plant_ids: &[Uuid]) -> BatchSummary {
        enum ItemOutcome {
            Processed,
            Skipped,
            Failed,
        }

        let outcomes: Vec<ItemOutcome> = stream::iter(plant_ids.iter().copied())
            .map(|plant_id| {
                let engine = self.engine.clone();
                async move {
                    match engine.process(plant_id, ProcessOptions::scheduled()).await {
                        Ok(outcome) if outcome.recomputed => ItemOutcome::Processed,
                        Ok(_) => ItemOutcome::Skipped,
                        Err(e) => {
                            // Per-plant error isolation: count and continue
                            tracing::error!(
                                plant_id = %plant_id,
                                error = %e,
                                "Plant processing failed during batch cycle"
                            );
                            ItemOutcome::Failed
                        }
                    }
                }
            })
            .buffer_unordered(self.config.batch_size.max(1))
            .collect()
            .await;

        let mut summary = BatchSummary::default();
        for outcome in outcomes {
            match outcome {
                ItemOutcome::Processed => summary.processed += 1,
                ItemOutcome::Skipped => summary.skipped += 1,
                ItemOutcome::Failed => summary.errors += 1,
            }
        }

        self.event_bus
            .emit_lossy(CultivaEvent::SchedulerCycleCompleted {
                processed: summary.processed,
                skipped: summary.skipped,
                errors: summary.errors,
                timestamp: time::now(),
            });

        summary
    }

    /// Delete analytics past the retention window, then sweep orphans.
    /// Returns (expired, orphaned) row counts.
    pub async fn run_retention_sweep(&self) -> Result<(u64, u64)> {
        let cutoff = time::now() - chrono::Duration::days(self.config.retention_days);
        let expired = self.store.delete_older_than(cutoff).await?;
        let orphans = self.store.delete_orphans().await?;

        if expired > 0 || orphans > 0 {
            tracing::info!(expired, orphans, "Retention sweep deleted records");
        }

        self.event_bus
            .emit_lossy(CultivaEvent::RetentionSweepCompleted {
                expired_deleted: expired,
                orphans_deleted: orphans,
                timestamp: time::now(),
            });

        Ok((expired, orphans))
    }

    /// Lightweight health probe: connectivity plus a count of active
    /// plants that have not been analyzed in the last 24 hours. A warning
    /// signal, not an alerting mechanism.
    pub async fn run_health_probe(&self) -> Result<()> {
        let database_ok = sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.db)
            .await
            .is_ok();

        let stale_plants = if database_ok {
            db::plants::count_stale_active(&self.db, 24).await?
        } else {
            0
        };

        if !database_ok {
            tracing::warn!("Health probe: database connectivity check failed");
        } else if stale_plants > 0 {
            tracing::warn!(
                stale_plants,
                "Health probe: active plants without recent analytics"
            );
        } else {
            tracing::debug!("Health probe: ok");
        }

        self.event_bus.emit_lossy(CultivaEvent::HealthProbe {
            database_ok,
            stale_plants,
            timestamp: time::now(),
        });

        Ok(())
    }
}
