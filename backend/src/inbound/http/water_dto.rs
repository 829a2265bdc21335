//! Wire shapes for the water ledger endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::ResetOutcome;
use crate::domain::{DailyRecord, LedgerEntry};

/// Body for `POST /water/add`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AddIntakeRequest {
    /// Millilitres to add; must not be negative.
    #[schema(example = 250)]
    pub amount: Option<i64>,
    /// Optional free-text note stored on the entry.
    pub note: Option<String>,
}

/// Body carrying a single millilitre amount.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AmountRequest {
    /// Millilitres; must not be negative.
    #[schema(example = 500)]
    pub amount: Option<i64>,
}

/// Body for `PUT /water/goal`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct GoalRequest {
    /// Goal in litres; must be positive.
    #[schema(example = 2.5)]
    pub goal: Option<f64>,
}

/// Query string for `GET /water/history`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryParams {
    /// Trailing window in days, today included.
    #[param(minimum = 1, maximum = 31, example = 7)]
    pub days: Option<u32>,
}

/// One ledger entry.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LedgerEntryResponse {
    /// Entry identifier.
    pub id: String,
    /// Signed millilitres; removals are negative.
    pub amount: i64,
    /// RFC 3339 instant the entry was recorded.
    pub timestamp: String,
    /// Free-text note, empty when none was given.
    pub note: String,
}

impl From<&LedgerEntry> for LedgerEntryResponse {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            amount: entry.amount_milliliters,
            timestamp: entry.recorded_at.to_rfc3339(),
            note: entry.note.clone(),
        }
    }
}

/// A daily record with its progress projection.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecordResponse {
    /// Record identifier.
    pub id: String,
    /// Owning account.
    pub account_id: String,
    /// Calendar day, `YYYY-MM-DD`.
    #[schema(example = "2024-06-30")]
    pub day_key: String,
    /// Goal in litres.
    pub goal_liters: f64,
    /// Running total in millilitres.
    pub total_milliliters: i64,
    /// Entries in creation order.
    pub entries: Vec<LedgerEntryResponse>,
    /// RFC 3339 creation instant.
    pub created_at: String,
    /// RFC 3339 last modification instant.
    pub updated_at: String,
    /// Goal converted to millilitres.
    pub goal_milliliters: i64,
    /// Millilitres left to drink, never negative.
    pub remaining_milliliters: i64,
    /// Whole-number progress, capped at 100.
    #[schema(minimum = 0, maximum = 100)]
    pub progress_percent: u8,
}

impl From<&DailyRecord> for DailyRecordResponse {
    fn from(record: &DailyRecord) -> Self {
        Self {
            id: record.id().to_string(),
            account_id: record.account_id().to_string(),
            day_key: record.day_key().to_string(),
            goal_liters: record.goal().liters(),
            total_milliliters: record.total_milliliters(),
            entries: record.entries().iter().map(LedgerEntryResponse::from).collect(),
            created_at: record.created_at().to_rfc3339(),
            updated_at: record.updated_at().to_rfc3339(),
            goal_milliliters: record.goal_milliliters(),
            remaining_milliliters: record.remaining_milliliters(),
            progress_percent: record.progress_percent(),
        }
    }
}

impl From<DailyRecord> for DailyRecordResponse {
    fn from(record: DailyRecord) -> Self {
        Self::from(&record)
    }
}

const ALREADY_RESET: &str = "Already reset.";
const RESET_DONE: &str = "Water data reset for today.";

/// Result of `POST /water/reset`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResetResponse {
    /// Human-readable summary.
    #[schema(example = "Water data reset for today.")]
    pub message: String,
    /// Always true: today has no intake after the call.
    pub reset: bool,
    /// The cleared record, absent when today had none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<DailyRecordResponse>,
}

impl From<ResetOutcome> for ResetResponse {
    fn from(outcome: ResetOutcome) -> Self {
        match outcome {
            ResetOutcome::AlreadyReset => Self {
                message: ALREADY_RESET.to_owned(),
                reset: true,
                record: None,
            },
            ResetOutcome::Reset(record) => Self {
                message: RESET_DONE.to_owned(),
                reset: true,
                record: Some(DailyRecordResponse::from(record)),
            },
        }
    }
}
