//! Daily water ledger model.
//!
//! A [`DailyRecord`] binds an account, a calendar day, a goal, a running total,
//! and an ordered list of [`LedgerEntry`] events. All mutations go through the
//! record so the total stays in step with the entries.

mod record;
mod values;

pub use record::{DailyRecord, DailyRecordSnapshot, EntryNotFound, LedgerEntry};
pub use values::{
    DEFAULT_GOAL_LITERS, EntryId, GoalLiters, IntakeAmount, LedgerValidationError,
    MAX_AMOUNT_MILLILITERS, RecordId,
};
