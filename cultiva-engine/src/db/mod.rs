//! Database access for the analytics engine
//!
//! Free async functions over the shared SqlitePool. Timestamps are stored
//! as RFC3339 TEXT; nested payloads (efficiency, recommendations) as JSON
//! in TEXT columns.

pub mod activity;
pub mod analytics;
pub mod feedback;
pub mod plants;
pub mod samples;
