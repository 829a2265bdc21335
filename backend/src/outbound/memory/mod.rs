//! In-process adapters used when no database is configured, and by tests.

mod account_store;
mod daily_record_repository;

pub use account_store::InMemoryAccountStore;
pub use daily_record_repository::InMemoryDailyRecordRepository;
