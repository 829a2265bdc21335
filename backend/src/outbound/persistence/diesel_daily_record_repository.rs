//! PostgreSQL-backed `DailyRecordRepository`.
//!
//! A record is one `daily_records` row plus its `ledger_entries` rows. Saves
//! write both inside one transaction: the row is inserted or updated under a
//! revision guard, then the entries are replaced wholesale.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{DailyRecordRepository, DailyRecordRepositoryError};
use crate::domain::{
    AccountId, DailyRecord, DailyRecordSnapshot, DayKey, EntryId, GoalLiters, LedgerEntry,
    RecordId,
};

use super::error_mapping::{DbFailure, classify_diesel_error, classify_pool_error};
use super::models::{
    DailyRecordRow, DailyRecordUpdate, LedgerEntryRow, NewDailyRecordRow, NewLedgerEntryRow,
};
use super::pool::DbPool;
use super::schema::{daily_records, ledger_entries};

/// Diesel implementation of the daily record store.
#[derive(Clone)]
pub struct DieselDailyRecordRepository {
    pool: DbPool,
}

impl DieselDailyRecordRepository {
    /// Create a repository over a connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl From<DbFailure> for DailyRecordRepositoryError {
    fn from(failure: DbFailure) -> Self {
        match failure {
            DbFailure::Connection(message) => Self::connection(message),
            DbFailure::UniqueViolation(constraint) => {
                Self::conflict(format!("unique constraint {constraint} violated"))
            }
            DbFailure::Query(message) => Self::query(message),
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> DailyRecordRepositoryError {
    classify_diesel_error(error).into()
}

fn map_pool_error(error: super::pool::PoolError) -> DailyRecordRepositoryError {
    classify_pool_error(error).into()
}

fn revision_to_db(revision: u32) -> Result<i32, DailyRecordRepositoryError> {
    i32::try_from(revision)
        .map_err(|_| DailyRecordRepositoryError::query(format!("revision {revision} out of range")))
}

fn revision_from_db(revision: i32) -> Result<u32, DailyRecordRepositoryError> {
    u32::try_from(revision).map_err(|_| {
        DailyRecordRepositoryError::query(format!("stored revision {revision} is negative"))
    })
}

fn entry_from_row(row: LedgerEntryRow) -> LedgerEntry {
    LedgerEntry {
        id: EntryId::from_uuid(row.id),
        amount_milliliters: row.amount_milliliters,
        recorded_at: row.recorded_at,
        note: row.note,
    }
}

fn record_from_rows(
    row: DailyRecordRow,
    entries: Vec<LedgerEntryRow>,
) -> Result<DailyRecord, DailyRecordRepositoryError> {
    let goal = GoalLiters::new(row.goal_liters).map_err(|err| {
        DailyRecordRepositoryError::query(format!("stored goal for record {} invalid: {err}", row.id))
    })?;
    Ok(DailyRecord::restore(DailyRecordSnapshot {
        id: RecordId::from_uuid(row.id),
        account_id: AccountId::from_uuid(row.account_id),
        day_key: DayKey::from_date(row.day_key),
        goal,
        total_milliliters: row.total_milliliters,
        entries: entries.into_iter().map(entry_from_row).collect(),
        created_at: row.created_at,
        updated_at: row.updated_at,
        revision: revision_from_db(row.revision)?,
    }))
}

fn entry_rows(record: &DailyRecord) -> Result<Vec<NewLedgerEntryRow<'_>>, DailyRecordRepositoryError> {
    let record_id = *record.id().as_uuid();
    record
        .entries()
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let position = i32::try_from(index).map_err(|_| {
                DailyRecordRepositoryError::query("too many entries in one record")
            })?;
            Ok(NewLedgerEntryRow {
                id: *entry.id.as_uuid(),
                record_id,
                position,
                amount_milliliters: entry.amount_milliliters,
                recorded_at: entry.recorded_at,
                note: entry.note.as_str(),
            })
        })
        .collect()
}

/// Whether a guarded write found the row it expected.
enum WriteOutcome {
    Written,
    Stale,
}

async fn load_entries(
    conn: &mut AsyncPgConnection,
    record_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<LedgerEntryRow>>, DailyRecordRepositoryError> {
    let rows: Vec<LedgerEntryRow> = ledger_entries::table
        .filter(ledger_entries::record_id.eq_any(record_ids))
        .order((ledger_entries::record_id.asc(), ledger_entries::position.asc()))
        .select(LedgerEntryRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;

    let mut grouped: HashMap<Uuid, Vec<LedgerEntryRow>> = HashMap::new();
    for row in rows {
        grouped.entry(row.record_id).or_default().push(row);
    }
    Ok(grouped)
}

async fn assemble(
    conn: &mut AsyncPgConnection,
    rows: Vec<DailyRecordRow>,
) -> Result<Vec<DailyRecord>, DailyRecordRepositoryError> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut entries = load_entries(conn, &ids).await?;
    rows.into_iter()
        .map(|row| {
            let record_entries = entries.remove(&row.id).unwrap_or_default();
            record_from_rows(row, record_entries)
        })
        .collect()
}

impl DieselDailyRecordRepository {
    async fn load_one(
        &self,
        row: Option<DailyRecordRow>,
        conn: &mut AsyncPgConnection,
    ) -> Result<Option<DailyRecord>, DailyRecordRepositoryError> {
        match row {
            Some(row) => Ok(assemble(conn, vec![row]).await?.into_iter().next()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl DailyRecordRepository for DieselDailyRecordRepository {
    async fn find(
        &self,
        account_id: &AccountId,
        day_key: DayKey,
    ) -> Result<Option<DailyRecord>, DailyRecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<DailyRecordRow> = daily_records::table
            .filter(daily_records::account_id.eq(account_id.as_uuid()))
            .filter(daily_records::day_key.eq(day_key.as_date()))
            .select(DailyRecordRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        self.load_one(row, &mut conn).await
    }

    async fn find_by_entry_id(
        &self,
        account_id: &AccountId,
        entry_id: EntryId,
    ) -> Result<Option<DailyRecord>, DailyRecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<DailyRecordRow> = daily_records::table
            .inner_join(ledger_entries::table)
            .filter(daily_records::account_id.eq(account_id.as_uuid()))
            .filter(ledger_entries::id.eq(entry_id.as_uuid()))
            .select(DailyRecordRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        self.load_one(row, &mut conn).await
    }

    async fn save(
        &self,
        record: &DailyRecord,
        expected_revision: Option<u32>,
    ) -> Result<(), DailyRecordRepositoryError> {
        let record_id = *record.id().as_uuid();
        let revision = revision_to_db(record.revision())?;
        let expected = expected_revision.map(revision_to_db).transpose()?;
        let entries = entry_rows(record)?;
        let new_row = NewDailyRecordRow {
            id: record_id,
            account_id: *record.account_id().as_uuid(),
            day_key: record.day_key().as_date(),
            goal_liters: record.goal().liters(),
            total_milliliters: record.total_milliliters(),
            revision,
            created_at: record.created_at(),
            updated_at: record.updated_at(),
        };
        let update = DailyRecordUpdate {
            goal_liters: record.goal().liters(),
            total_milliliters: record.total_milliliters(),
            revision,
            updated_at: record.updated_at(),
        };

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let outcome = conn
            .transaction(|conn| {
                async move {
                    match expected {
                        None => {
                            diesel::insert_into(daily_records::table)
                                .values(&new_row)
                                .execute(conn)
                                .await?;
                        }
                        Some(expected) => {
                            let updated = diesel::update(daily_records::table)
                                .filter(daily_records::id.eq(record_id))
                                .filter(daily_records::revision.eq(expected))
                                .set(&update)
                                .execute(conn)
                                .await?;
                            if updated == 0 {
                                return Ok(WriteOutcome::Stale);
                            }
                            diesel::delete(
                                ledger_entries::table
                                    .filter(ledger_entries::record_id.eq(record_id)),
                            )
                            .execute(conn)
                            .await?;
                        }
                    }

                    if !entries.is_empty() {
                        diesel::insert_into(ledger_entries::table)
                            .values(&entries)
                            .execute(conn)
                            .await?;
                    }
                    Ok(WriteOutcome::Written)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        match outcome {
            WriteOutcome::Written => Ok(()),
            WriteOutcome::Stale => {
                debug!(record_id = %record_id, ?expected_revision, "stale daily record write");
                Err(DailyRecordRepositoryError::conflict(format!(
                    "record {record_id} is no longer at revision {}",
                    expected_revision.unwrap_or_default()
                )))
            }
        }
    }

    async fn query_range(
        &self,
        account_id: &AccountId,
        from: DayKey,
        to: DayKey,
    ) -> Result<Vec<DailyRecord>, DailyRecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<DailyRecordRow> = daily_records::table
            .filter(daily_records::account_id.eq(account_id.as_uuid()))
            .filter(daily_records::day_key.ge(from.as_date()))
            .filter(daily_records::day_key.le(to.as_date()))
            .order(daily_records::day_key.desc())
            .select(DailyRecordRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        assemble(&mut conn, rows).await
    }

    async fn query_all(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<DailyRecord>, DailyRecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<DailyRecordRow> = daily_records::table
            .filter(daily_records::account_id.eq(account_id.as_uuid()))
            .order(daily_records::day_key.desc())
            .select(DailyRecordRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        assemble(&mut conn, rows).await
    }
}
