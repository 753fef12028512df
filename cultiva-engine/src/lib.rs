//! cultiva-engine library interface
//!
//! Cultivation analytics: turns raw environment samples and activity
//! events into cached, versioned analytics records and rule-evaluated
//! recommendations, kept fresh by a background scheduler.

pub mod db;
pub mod engine;
pub mod feedback;
pub mod metrics;
pub mod models;
pub mod recommend;
pub mod scheduler;
pub mod store;

pub use engine::{AnalyticsEngine, ProcessOptions, ProcessOutcome};
pub use feedback::FeedbackService;
pub use recommend::{GenerateOptions, RecommendationCache, RecommendationEngine};
pub use scheduler::{AnalyticsScheduler, BatchSummary, SchedulerConfig, SchedulerStatus};
pub use store::AnalyticsStore;
