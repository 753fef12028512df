//! Database access for Cultiva
//!
//! One shared SQLite database holds the externally-owned cultivation tables
//! (plants, environment samples, activity log) and the tables this engine
//! owns (analytics records, recommendation history).

pub mod init;
pub mod models;

pub use init::init_database;
