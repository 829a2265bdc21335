//! Driving port for read-only history projections.

use async_trait::async_trait;

use crate::domain::{AccountId, DailyRecord, Error};

/// History reads for the authenticated account. Results are newest first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WaterHistoryQuery: Send + Sync {
    /// Records from the last `window_days` days up to and including today.
    ///
    /// `None` uses the configured default window.
    async fn recent_history(
        &self,
        account_id: &AccountId,
        window_days: Option<u32>,
    ) -> Result<Vec<DailyRecord>, Error>;

    /// Every record the account has.
    async fn all_history(&self, account_id: &AccountId) -> Result<Vec<DailyRecord>, Error>;
}
