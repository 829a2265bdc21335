//! Driving port for daily ledger mutations.
//!
//! Amounts arrive as raw millilitre counts and goals as raw litres; the
//! implementation validates them so every adapter gets the same
//! `invalid_amount` error shape.

use async_trait::async_trait;

use crate::domain::{AccountId, DailyRecord, DayKey, EntryId, Error};

/// Result of resetting today's record.
#[derive(Debug, Clone, PartialEq)]
pub enum ResetOutcome {
    /// No record existed for today, so nothing was written.
    AlreadyReset,
    /// The record was cleared and stored.
    Reset(DailyRecord),
}

/// Ledger mutations for the authenticated account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WaterLedgerCommand: Send + Sync {
    /// Load today's record, creating an empty one when absent.
    async fn get_or_create_today(&self, account_id: &AccountId) -> Result<DailyRecord, Error>;

    /// Append an intake entry to today's record.
    async fn add_intake(
        &self,
        account_id: &AccountId,
        amount_milliliters: i64,
        note: Option<String>,
    ) -> Result<DailyRecord, Error>;

    /// Delete an entry from whichever of the account's records holds it.
    async fn remove_entry_by_id(
        &self,
        account_id: &AccountId,
        entry_id: EntryId,
    ) -> Result<DailyRecord, Error>;

    /// Append a negative correction entry to today's record.
    async fn remove_amount(
        &self,
        account_id: &AccountId,
        amount_milliliters: i64,
    ) -> Result<DailyRecord, Error>;

    /// Change today's goal.
    async fn set_goal(&self, account_id: &AccountId, goal_liters: f64)
    -> Result<DailyRecord, Error>;

    /// Overwrite the total of an existing record without touching entries.
    async fn set_amount_for_date(
        &self,
        account_id: &AccountId,
        day_key: DayKey,
        amount_milliliters: i64,
    ) -> Result<DailyRecord, Error>;

    /// Change one entry's amount and recompute its record's total.
    async fn set_amount_by_id(
        &self,
        account_id: &AccountId,
        entry_id: EntryId,
        amount_milliliters: i64,
    ) -> Result<DailyRecord, Error>;

    /// Clear today's entries and zero its total, keeping the goal.
    async fn reset_today(&self, account_id: &AccountId) -> Result<ResetOutcome, Error>;
}
