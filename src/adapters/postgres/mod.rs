//! PostgreSQL adapters - Database implementations for scheduling ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresSchedulingStore` - Transactional writes behind `SchedulingStore`
//! - `PostgresScheduleReader` - Read-optimized schedule queries

mod reader;
mod rows;
mod store;

pub use reader::PostgresScheduleReader;
pub use store::{PostgresSchedulingStore, PostgresTransaction};

/// Embedded schema migrations from `migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
