//! Driven port for daily record storage.
//!
//! A store holds at most one [`DailyRecord`] per `(account, day)` pair. Writes
//! replace the whole record, entries included, and are guarded by the
//! revision the caller read.

use async_trait::async_trait;

use crate::domain::{AccountId, DailyRecord, DayKey, EntryId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by daily record store adapters.
    pub enum DailyRecordRepositoryError {
        /// The store could not be reached.
        Connection { message: String } =>
            "daily record store connection failed: {message}",
        /// A query or mutation failed during execution.
        Query { message: String } =>
            "daily record store query failed: {message}",
        /// The write lost a race: either another writer created the same
        /// `(account, day)` record or the stored revision moved on.
        Conflict { message: String } =>
            "daily record write conflict: {message}",
    }
}

/// Storage contract for daily records.
///
/// # Revision semantics
///
/// - `save(record, None)` inserts a new record and fails with
///   [`DailyRecordRepositoryError::Conflict`] when one already exists for the
///   same account and day.
/// - `save(record, Some(n))` replaces the stored record only while its
///   revision is `n`, and fails with `Conflict` otherwise.
/// - Callers set `record.revision()` to the new value before saving.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DailyRecordRepository: Send + Sync {
    /// Fetch the record for an account and day.
    async fn find(
        &self,
        account_id: &AccountId,
        day_key: DayKey,
    ) -> Result<Option<DailyRecord>, DailyRecordRepositoryError>;

    /// Fetch the account's record containing `entry_id`, on any day.
    async fn find_by_entry_id(
        &self,
        account_id: &AccountId,
        entry_id: EntryId,
    ) -> Result<Option<DailyRecord>, DailyRecordRepositoryError>;

    /// Insert or replace a record under the revision check described above.
    async fn save(
        &self,
        record: &DailyRecord,
        expected_revision: Option<u32>,
    ) -> Result<(), DailyRecordRepositoryError>;

    /// Records with `from <= day_key <= to`, newest day first.
    async fn query_range(
        &self,
        account_id: &AccountId,
        from: DayKey,
        to: DayKey,
    ) -> Result<Vec<DailyRecord>, DailyRecordRepositoryError>;

    /// Every record for the account, newest day first.
    async fn query_all(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<DailyRecord>, DailyRecordRepositoryError>;
}
