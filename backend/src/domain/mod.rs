//! Domain primitives, aggregates and services.
//!
//! Purpose: keep the water ledger rules independent of HTTP and storage.
//! Inbound adapters call the driving ports in [`ports`]; outbound adapters
//! implement the driven ones.
//!
//! Public surface:
//! - [`DailyRecord`] and [`LedgerEntry`]: the per-account, per-day ledger.
//! - [`DayKey`], [`DayBoundary`], [`DayKeyResolver`]: calendar-day mapping.
//! - [`WaterLedgerService`], [`WaterHistoryService`], [`AccountService`]:
//!   driving port implementations.
//! - [`Error`] and [`ErrorCode`]: transport-agnostic failures.

pub mod account;
pub mod account_service;
pub mod auth;
pub mod day_key;
pub mod error;
pub mod history_service;
pub mod ledger;
pub mod ledger_service;
pub mod ports;
pub mod trace_id;

pub use self::account::{
    Account, AccountId, AccountValidationError, USERNAME_MAX, USERNAME_MIN, Username,
};
pub use self::account_service::AccountService;
pub use self::auth::{Credentials, CredentialsValidationError, Registration};
pub use self::day_key::{
    DayBoundary, DayBoundaryParseError, DayKey, DayKeyParseError, DayKeyResolver, DayOrder,
};
pub use self::error::{Error, ErrorCode};
pub use self::history_service::{
    DEFAULT_HISTORY_WINDOW_DAYS, MAX_HISTORY_WINDOW_DAYS, WaterHistoryService,
};
pub use self::ledger::{
    DEFAULT_GOAL_LITERS, DailyRecord, DailyRecordSnapshot, EntryId, EntryNotFound, GoalLiters,
    IntakeAmount, LedgerEntry, LedgerValidationError, MAX_AMOUNT_MILLILITERS, RecordId,
};
pub use self::ledger_service::WaterLedgerService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

