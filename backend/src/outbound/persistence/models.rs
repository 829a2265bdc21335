//! Internal Diesel row structs.
//!
//! Rows never leave the persistence module; adapters convert them to domain
//! types at the boundary.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{accounts, daily_records, ledger_entries};

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Row read from `accounts`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AccountRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
}

/// Insertable account row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub(crate) struct NewAccountRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub password_hash: &'a str,
}

// ---------------------------------------------------------------------------
// Daily records
// ---------------------------------------------------------------------------

/// Row read from `daily_records`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = daily_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DailyRecordRow {
    pub id: Uuid,
    pub account_id: Uuid,
    pub day_key: NaiveDate,
    pub goal_liters: f64,
    pub total_milliliters: i64,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full row written on insert.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = daily_records)]
pub(crate) struct NewDailyRecordRow {
    pub id: Uuid,
    pub account_id: Uuid,
    pub day_key: NaiveDate,
    pub goal_liters: f64,
    pub total_milliliters: i64,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable columns written on a revision-guarded update.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = daily_records)]
pub(crate) struct DailyRecordUpdate {
    pub goal_liters: f64,
    pub total_milliliters: i64,
    pub revision: i32,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Ledger entries
// ---------------------------------------------------------------------------

/// Row read from `ledger_entries`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = ledger_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LedgerEntryRow {
    pub id: Uuid,
    pub record_id: Uuid,
    #[expect(dead_code, reason = "selected for ordering only")]
    pub position: i32,
    pub amount_milliliters: i64,
    pub recorded_at: DateTime<Utc>,
    pub note: String,
}

/// Insertable entry row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ledger_entries)]
pub(crate) struct NewLedgerEntryRow<'a> {
    pub id: Uuid,
    pub record_id: Uuid,
    pub position: i32,
    pub amount_milliliters: i64,
    pub recorded_at: DateTime<Utc>,
    pub note: &'a str,
}
