//! Water ledger aggregation service.
//!
//! Every mutation is a read-modify-write against the daily record store. The
//! service reads the record, applies the intent, bumps the revision and
//! saves with the revision it read. When the store reports a conflict the
//! intent is re-applied to a fresh read once; a second conflict is returned
//! as a transient `service_unavailable` error.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::ports::{
    DailyRecordRepository, DailyRecordRepositoryError, LedgerMetrics, LedgerWriteOutcome,
    NoOpLedgerMetrics, ResetOutcome, WaterLedgerCommand,
};
use crate::domain::{
    AccountId, DailyRecord, DayKey, DayKeyResolver, EntryId, EntryNotFound, Error, GoalLiters,
    IntakeAmount, LedgerValidationError,
};

/// Number of times a conflicting write is re-applied before giving up.
const CONFLICT_RETRIES: u32 = 1;

/// Which record a mutation targets.
#[derive(Debug, Clone, Copy)]
enum Target {
    /// Today's record, created when absent.
    Today(DayKey),
    /// A record that must already exist.
    Day(DayKey),
    /// The account's record holding this entry.
    Entry(EntryId),
}

/// Ledger service implementing [`WaterLedgerCommand`].
#[derive(Clone)]
pub struct WaterLedgerService<R> {
    records: Arc<R>,
    resolver: DayKeyResolver,
    metrics: Arc<dyn LedgerMetrics>,
}

impl<R> WaterLedgerService<R> {
    /// Create a service over a record store and day-key resolver.
    pub fn new(records: Arc<R>, resolver: DayKeyResolver) -> Self {
        Self {
            records,
            resolver,
            metrics: Arc::new(NoOpLedgerMetrics),
        }
    }

    /// Replace the metrics sink.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn LedgerMetrics>) -> Self {
        self.metrics = metrics;
        self
    }
}

pub(crate) fn map_record_error(error: DailyRecordRepositoryError) -> Error {
    match error {
        DailyRecordRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("daily record store unavailable: {message}"))
        }
        DailyRecordRepositoryError::Query { message } => {
            Error::internal(format!("daily record store error: {message}"))
        }
        DailyRecordRepositoryError::Conflict { message } => write_conflict(message),
    }
}

fn write_conflict(message: String) -> Error {
    Error::service_unavailable(format!("concurrent update, please retry: {message}"))
        .with_details(json!({ "code": "write_conflict" }))
}

pub(crate) fn invalid_amount(field: &str, error: &LedgerValidationError) -> Error {
    let value = match error {
        LedgerValidationError::NegativeAmount { value }
        | LedgerValidationError::AmountTooLarge { value, .. } => json!(value),
        LedgerValidationError::InvalidGoal { value } => json!(value),
    };
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": field,
        "value": value,
        "code": "invalid_amount",
    }))
}

fn parse_amount(field: &str, milliliters: i64) -> Result<IntakeAmount, Error> {
    IntakeAmount::new(milliliters).map_err(|err| invalid_amount(field, &err))
}

fn entry_not_found(error: EntryNotFound) -> Error {
    Error::not_found(error.to_string())
}

impl<R> WaterLedgerService<R>
where
    R: DailyRecordRepository,
{
    async fn load(&self, account_id: &AccountId, target: Target) -> Result<DailyRecord, Error> {
        match target {
            Target::Today(day_key) => {
                let found = self
                    .records
                    .find(account_id, day_key)
                    .await
                    .map_err(map_record_error)?;
                Ok(found.unwrap_or_else(|| {
                    DailyRecord::open(*account_id, day_key, self.resolver.now())
                }))
            }
            Target::Day(day_key) => self
                .records
                .find(account_id, day_key)
                .await
                .map_err(map_record_error)?
                .ok_or_else(|| Error::not_found(format!("no record for {day_key}"))),
            Target::Entry(entry_id) => self
                .records
                .find_by_entry_id(account_id, entry_id)
                .await
                .map_err(map_record_error)?
                .ok_or_else(|| Error::not_found(format!("entry {entry_id} not found"))),
        }
    }

    /// Load, mutate, and store a record, re-applying `apply` after a conflict.
    async fn commit<F>(
        &self,
        operation: &'static str,
        account_id: &AccountId,
        target: Target,
        apply: F,
    ) -> Result<DailyRecord, Error>
    where
        F: Fn(&mut DailyRecord) -> Result<(), Error> + Send + Sync,
    {
        let mut attempt = 0;
        loop {
            let mut record = self.load(account_id, target).await?;
            apply(&mut record)?;
            let expected = record.expected_revision();
            record.advance_revision(self.resolver.now());
            debug!(
                operation,
                account_id = %account_id,
                day_key = %record.day_key(),
                revision = record.revision(),
                "saving daily record"
            );

            match self.records.save(&record, expected).await {
                Ok(()) => {
                    let outcome = if attempt == 0 {
                        LedgerWriteOutcome::Committed
                    } else {
                        LedgerWriteOutcome::CommittedAfterRetry
                    };
                    self.metrics.record_write(operation, outcome);
                    return Ok(record);
                }
                Err(DailyRecordRepositoryError::Conflict { message }) => {
                    if attempt >= CONFLICT_RETRIES {
                        warn!(operation, account_id = %account_id, %message, "write conflict persisted after retry");
                        self.metrics
                            .record_write(operation, LedgerWriteOutcome::ConflictExhausted);
                        return Err(write_conflict(message));
                    }
                    warn!(operation, account_id = %account_id, %message, "write conflict, re-applying");
                    attempt += 1;
                }
                Err(other) => {
                    self.metrics
                        .record_write(operation, LedgerWriteOutcome::StoreFailed);
                    return Err(map_record_error(other));
                }
            }
        }
    }
}

#[async_trait]
impl<R> WaterLedgerCommand for WaterLedgerService<R>
where
    R: DailyRecordRepository,
{
    async fn get_or_create_today(&self, account_id: &AccountId) -> Result<DailyRecord, Error> {
        let today = self.resolver.today();
        if let Some(record) = self
            .records
            .find(account_id, today)
            .await
            .map_err(map_record_error)?
        {
            return Ok(record);
        }

        let mut record = DailyRecord::open(*account_id, today, self.resolver.now());
        record.advance_revision(record.created_at());
        match self.records.save(&record, None).await {
            Ok(()) => {
                debug!(account_id = %account_id, day_key = %today, "created daily record");
                Ok(record)
            }
            // Lost the insert race: whoever won created the same empty record.
            Err(DailyRecordRepositoryError::Conflict { message }) => self
                .records
                .find(account_id, today)
                .await
                .map_err(map_record_error)?
                .ok_or_else(|| write_conflict(message)),
            Err(other) => Err(map_record_error(other)),
        }
    }

    async fn add_intake(
        &self,
        account_id: &AccountId,
        amount_milliliters: i64,
        note: Option<String>,
    ) -> Result<DailyRecord, Error> {
        let amount = parse_amount("amount", amount_milliliters)?;
        let target = Target::Today(self.resolver.today());
        let now = self.resolver.now();
        self.commit("add_intake", account_id, target, |record| {
            record.append_intake(amount, note.clone(), now);
            Ok(())
        })
        .await
    }

    async fn remove_entry_by_id(
        &self,
        account_id: &AccountId,
        entry_id: EntryId,
    ) -> Result<DailyRecord, Error> {
        self.commit(
            "remove_entry_by_id",
            account_id,
            Target::Entry(entry_id),
            |record| record.remove_entry(entry_id).map(drop).map_err(entry_not_found),
        )
        .await
    }

    async fn remove_amount(
        &self,
        account_id: &AccountId,
        amount_milliliters: i64,
    ) -> Result<DailyRecord, Error> {
        let amount = parse_amount("amount", amount_milliliters)?;
        let target = Target::Today(self.resolver.today());
        let now = self.resolver.now();
        self.commit("remove_amount", account_id, target, |record| {
            record.append_removal(amount, now);
            Ok(())
        })
        .await
    }

    async fn set_goal(
        &self,
        account_id: &AccountId,
        goal_liters: f64,
    ) -> Result<DailyRecord, Error> {
        let goal = GoalLiters::new(goal_liters).map_err(|err| invalid_amount("goal", &err))?;
        let target = Target::Today(self.resolver.today());
        self.commit("set_goal", account_id, target, |record| {
            record.set_goal(goal);
            Ok(())
        })
        .await
    }

    async fn set_amount_for_date(
        &self,
        account_id: &AccountId,
        day_key: DayKey,
        amount_milliliters: i64,
    ) -> Result<DailyRecord, Error> {
        let amount = parse_amount("amount", amount_milliliters)?;
        self.commit(
            "set_amount_for_date",
            account_id,
            Target::Day(day_key),
            |record| {
                record.override_total(amount);
                Ok(())
            },
        )
        .await
    }

    async fn set_amount_by_id(
        &self,
        account_id: &AccountId,
        entry_id: EntryId,
        amount_milliliters: i64,
    ) -> Result<DailyRecord, Error> {
        let amount = parse_amount("amount", amount_milliliters)?;
        self.commit(
            "set_amount_by_id",
            account_id,
            Target::Entry(entry_id),
            |record| {
                record
                    .set_entry_amount(entry_id, amount)
                    .map_err(entry_not_found)
            },
        )
        .await
    }

    async fn reset_today(&self, account_id: &AccountId) -> Result<ResetOutcome, Error> {
        let today = self.resolver.today();
        let existing = self
            .records
            .find(account_id, today)
            .await
            .map_err(map_record_error)?;
        if existing.is_none() {
            debug!(account_id = %account_id, day_key = %today, "nothing to reset");
            return Ok(ResetOutcome::AlreadyReset);
        }

        let record = self
            .commit("reset_today", account_id, Target::Day(today), |record| {
                record.reset();
                Ok(())
            })
            .await?;
        Ok(ResetOutcome::Reset(record))
    }
}

#[cfg(test)]
#[path = "ledger_service_tests.rs"]
mod tests;
