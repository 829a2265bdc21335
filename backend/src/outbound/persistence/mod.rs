//! PostgreSQL persistence adapters using Diesel.
//!
//! Adapters translate between Diesel row structs and domain types and map
//! database failures onto port errors. Row structs (`models`) and table
//! definitions (`schema`) stay private to this module.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use waterlog::outbound::persistence::{DbPool, DieselDailyRecordRepository, PoolConfig};
//!
//! # async fn build() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/waterlog")).await?;
//! let records = Arc::new(DieselDailyRecordRepository::new(pool));
//! # let _ = records;
//! # Ok(())
//! # }
//! ```

mod diesel_account_store;
mod diesel_daily_record_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_account_store::DieselAccountStore;
pub use diesel_daily_record_repository::DieselDailyRecordRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
