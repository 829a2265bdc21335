//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`DailyRecordRepository`, `AccountStore`, `LedgerMetrics`)
//! are implemented by outbound adapters. Driving ports
//! (`WaterLedgerCommand`, `WaterHistoryQuery`, `AccountCommand`) are
//! implemented by domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod account_store;
mod daily_record_repository;
mod ledger_metrics;
mod water_history_query;
mod water_ledger_command;

pub use account_command::AccountCommand;
#[cfg(test)]
pub use account_command::MockAccountCommand;
#[cfg(test)]
pub use account_store::MockAccountStore;
pub use account_store::{AccountStore, AccountStoreError};
#[cfg(test)]
pub use daily_record_repository::MockDailyRecordRepository;
pub use daily_record_repository::{DailyRecordRepository, DailyRecordRepositoryError};
#[cfg(test)]
pub use ledger_metrics::MockLedgerMetrics;
pub use ledger_metrics::{LedgerMetrics, LedgerWriteOutcome, NoOpLedgerMetrics};
#[cfg(test)]
pub use water_history_query::MockWaterHistoryQuery;
pub use water_history_query::WaterHistoryQuery;
#[cfg(test)]
pub use water_ledger_command::MockWaterLedgerCommand;
pub use water_ledger_command::{ResetOutcome, WaterLedgerCommand};
