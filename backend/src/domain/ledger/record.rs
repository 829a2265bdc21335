//! The per-account, per-day water ledger aggregate.

use chrono::{DateTime, Utc};

use super::values::{EntryId, GoalLiters, IntakeAmount, RecordId};
use crate::domain::{AccountId, DayKey};

/// One dated intake or correction event.
///
/// Positive amounts are intake; negative amounts are logged removals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Immutable identifier assigned at creation.
    pub id: EntryId,
    /// Signed amount in millilitres.
    pub amount_milliliters: i64,
    /// Instant the event was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Free-text annotation; empty when none was supplied.
    pub note: String,
}

/// Raised when an entry id is not part of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("entry {entry_id} not found in daily record")]
pub struct EntryNotFound {
    /// Identifier that was looked up.
    pub entry_id: EntryId,
}

/// Stored representation used by persistence adapters to rebuild a record.
///
/// The total is taken as stored, so records whose total was overridden
/// directly keep that value.
#[derive(Debug, Clone)]
pub struct DailyRecordSnapshot {
    /// Record identifier.
    pub id: RecordId,
    /// Owning account.
    pub account_id: AccountId,
    /// Calendar day the record covers.
    pub day_key: DayKey,
    /// Goal in litres.
    pub goal: GoalLiters,
    /// Stored running total in millilitres.
    pub total_milliliters: i64,
    /// Entries in creation order.
    pub entries: Vec<LedgerEntry>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last modification instant.
    pub updated_at: DateTime<Utc>,
    /// Last committed revision.
    pub revision: u32,
}

/// Daily water ledger for one account and one calendar day.
///
/// ## Invariants
/// - `total_milliliters` equals the sum of entry amounts after every mutation
///   except [`DailyRecord::override_total`].
/// - Entries keep creation order; edits change amounts in place.
/// - `revision` is zero until the record is first committed.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    id: RecordId,
    account_id: AccountId,
    day_key: DayKey,
    goal: GoalLiters,
    total_milliliters: i64,
    entries: Vec<LedgerEntry>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    revision: u32,
}

fn sum_entries(entries: &[LedgerEntry]) -> i64 {
    entries
        .iter()
        .fold(0_i64, |acc, entry| acc.saturating_add(entry.amount_milliliters))
}

impl DailyRecord {
    /// Start an empty record with the default goal.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use waterlog::domain::{AccountId, DailyRecord, DayKey};
    ///
    /// let day: DayKey = "2024-06-30".parse().expect("valid day key");
    /// let record = DailyRecord::open(AccountId::random(), day, Utc::now());
    /// assert_eq!(record.total_milliliters(), 0);
    /// assert!((record.goal().liters() - 3.0).abs() < f64::EPSILON);
    /// ```
    #[must_use]
    pub fn open(account_id: AccountId, day_key: DayKey, now: DateTime<Utc>) -> Self {
        Self {
            id: RecordId::random(),
            account_id,
            day_key,
            goal: GoalLiters::default(),
            total_milliliters: 0,
            entries: Vec::new(),
            created_at: now,
            updated_at: now,
            revision: 0,
        }
    }

    /// Rebuild a record from its stored representation.
    #[must_use]
    pub fn restore(snapshot: DailyRecordSnapshot) -> Self {
        let DailyRecordSnapshot {
            id,
            account_id,
            day_key,
            goal,
            total_milliliters,
            entries,
            created_at,
            updated_at,
            revision,
        } = snapshot;
        Self {
            id,
            account_id,
            day_key,
            goal,
            total_milliliters,
            entries,
            created_at,
            updated_at,
            revision,
        }
    }

    /// Record identifier.
    #[must_use]
    pub const fn id(&self) -> RecordId {
        self.id
    }

    /// Owning account.
    #[must_use]
    pub const fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// Calendar day covered by this record.
    #[must_use]
    pub const fn day_key(&self) -> DayKey {
        self.day_key
    }

    /// Current goal.
    #[must_use]
    pub const fn goal(&self) -> GoalLiters {
        self.goal
    }

    /// Running total in millilitres.
    #[must_use]
    pub const fn total_milliliters(&self) -> i64 {
        self.total_milliliters
    }

    /// Entries in creation order.
    #[must_use]
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Creation instant.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification instant.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Last committed revision; zero for a record never stored.
    #[must_use]
    pub const fn revision(&self) -> u32 {
        self.revision
    }

    /// Revision a store must hold for this record to be replaced, or `None`
    /// when the record has never been stored.
    #[must_use]
    pub const fn expected_revision(&self) -> Option<u32> {
        if self.revision == 0 {
            None
        } else {
            Some(self.revision)
        }
    }

    /// Look up an entry by id.
    #[must_use]
    pub fn entry(&self, entry_id: EntryId) -> Option<&LedgerEntry> {
        self.entries.iter().find(|entry| entry.id == entry_id)
    }

    /// Whether the total equals the sum of entries.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.total_milliliters == sum_entries(&self.entries)
    }

    /// Goal converted to millilitres.
    #[must_use]
    pub fn goal_milliliters(&self) -> i64 {
        self.goal.milliliters()
    }

    /// Millilitres still needed to reach the goal, never below zero.
    #[must_use]
    pub fn remaining_milliliters(&self) -> i64 {
        self.goal_milliliters()
            .saturating_sub(self.total_milliliters)
            .max(0)
    }

    /// Whole-number progress towards the goal, capped to `0..=100`.
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        let goal = self.goal_milliliters();
        if goal <= 0 {
            return 0;
        }
        let percent = self.total_milliliters.max(0).saturating_mul(100) / goal;
        u8::try_from(percent.min(100)).unwrap_or(100)
    }

    /// Append an intake entry and add it to the total.
    pub fn append_intake(
        &mut self,
        amount: IntakeAmount,
        note: Option<String>,
        recorded_at: DateTime<Utc>,
    ) -> LedgerEntry {
        self.push_entry(amount.milliliters(), note.unwrap_or_default(), recorded_at)
    }

    /// Append a negative correction entry and subtract it from the total.
    ///
    /// The total may go below zero.
    pub fn append_removal(
        &mut self,
        amount: IntakeAmount,
        recorded_at: DateTime<Utc>,
    ) -> LedgerEntry {
        self.push_entry(-amount.milliliters(), String::new(), recorded_at)
    }

    fn push_entry(
        &mut self,
        amount_milliliters: i64,
        note: String,
        recorded_at: DateTime<Utc>,
    ) -> LedgerEntry {
        let entry = LedgerEntry {
            id: EntryId::random(),
            amount_milliliters,
            recorded_at,
            note,
        };
        self.total_milliliters = self.total_milliliters.saturating_add(amount_milliliters);
        self.entries.push(entry.clone());
        entry
    }

    /// Delete an entry and subtract its amount from the total.
    pub fn remove_entry(&mut self, entry_id: EntryId) -> Result<LedgerEntry, EntryNotFound> {
        let position = self
            .entries
            .iter()
            .position(|entry| entry.id == entry_id)
            .ok_or(EntryNotFound { entry_id })?;
        let removed = self.entries.remove(position);
        self.total_milliliters = self
            .total_milliliters
            .saturating_sub(removed.amount_milliliters);
        Ok(removed)
    }

    /// Replace an entry's amount and recompute the total from all entries.
    pub fn set_entry_amount(
        &mut self,
        entry_id: EntryId,
        amount: IntakeAmount,
    ) -> Result<(), EntryNotFound> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.id == entry_id)
            .ok_or(EntryNotFound { entry_id })?;
        entry.amount_milliliters = amount.milliliters();
        self.total_milliliters = sum_entries(&self.entries);
        Ok(())
    }

    /// Replace the goal. The total is untouched.
    pub fn set_goal(&mut self, goal: GoalLiters) {
        self.goal = goal;
    }

    /// Clear every entry and zero the total, keeping the goal.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.total_milliliters = 0;
    }

    /// Overwrite the total without touching entries.
    ///
    /// This is the only mutation allowed to leave the total out of step with
    /// the entries.
    pub fn override_total(&mut self, amount: IntakeAmount) {
        self.total_milliliters = amount.milliliters();
    }

    /// Stamp a pending write: bump the revision and the modification time.
    pub fn advance_revision(&mut self, now: DateTime<Utc>) {
        self.revision = self.revision.saturating_add(1);
        self.updated_at = now;
    }
}
