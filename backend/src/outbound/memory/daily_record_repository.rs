//! Mutex-guarded daily record store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{DailyRecordRepository, DailyRecordRepositoryError};
use crate::domain::{AccountId, DailyRecord, DayKey, EntryId};

type RecordMap = HashMap<(AccountId, DayKey), DailyRecord>;

/// Daily record store backed by a process-local map.
///
/// Saves swap the whole record under the lock, so readers never see a
/// partially applied write.
#[derive(Debug, Default)]
pub struct InMemoryDailyRecordRepository {
    records: Mutex<RecordMap>,
}

impl InMemoryDailyRecordRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, RecordMap>, DailyRecordRepositoryError> {
        self.records
            .lock()
            .map_err(|_| DailyRecordRepositoryError::connection("record map poisoned"))
    }
}

fn newest_first(mut records: Vec<DailyRecord>) -> Vec<DailyRecord> {
    records.sort_by_key(|record| std::cmp::Reverse(record.day_key()));
    records
}

#[async_trait]
impl DailyRecordRepository for InMemoryDailyRecordRepository {
    async fn find(
        &self,
        account_id: &AccountId,
        day_key: DayKey,
    ) -> Result<Option<DailyRecord>, DailyRecordRepositoryError> {
        Ok(self.lock()?.get(&(*account_id, day_key)).cloned())
    }

    async fn find_by_entry_id(
        &self,
        account_id: &AccountId,
        entry_id: EntryId,
    ) -> Result<Option<DailyRecord>, DailyRecordRepositoryError> {
        Ok(self
            .lock()?
            .values()
            .find(|record| record.account_id() == *account_id && record.entry(entry_id).is_some())
            .cloned())
    }

    async fn save(
        &self,
        record: &DailyRecord,
        expected_revision: Option<u32>,
    ) -> Result<(), DailyRecordRepositoryError> {
        let key = (record.account_id(), record.day_key());
        let mut records = self.lock()?;
        let stored = records.get(&key).map(DailyRecord::revision);
        match (stored, expected_revision) {
            (None, None) => {}
            (Some(_), None) => {
                return Err(DailyRecordRepositoryError::conflict(format!(
                    "record for {} already exists",
                    record.day_key()
                )));
            }
            (None, Some(expected)) => {
                return Err(DailyRecordRepositoryError::conflict(format!(
                    "expected revision {expected} but record is missing"
                )));
            }
            (Some(actual), Some(expected)) if actual != expected => {
                return Err(DailyRecordRepositoryError::conflict(format!(
                    "expected revision {expected} but found {actual}"
                )));
            }
            (Some(_), Some(_)) => {}
        }
        records.insert(key, record.clone());
        Ok(())
    }

    async fn query_range(
        &self,
        account_id: &AccountId,
        from: DayKey,
        to: DayKey,
    ) -> Result<Vec<DailyRecord>, DailyRecordRepositoryError> {
        let matching = self
            .lock()?
            .values()
            .filter(|record| {
                record.account_id() == *account_id
                    && record.day_key() >= from
                    && record.day_key() <= to
            })
            .cloned()
            .collect();
        Ok(newest_first(matching))
    }

    async fn query_all(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<DailyRecord>, DailyRecordRepositoryError> {
        let matching = self
            .lock()?
            .values()
            .filter(|record| record.account_id() == *account_id)
            .cloned()
            .collect();
        Ok(newest_first(matching))
    }
}
