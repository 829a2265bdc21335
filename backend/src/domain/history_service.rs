//! Read-only history projections over daily records.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::ledger_service::map_record_error;
use crate::domain::ports::{DailyRecordRepository, WaterHistoryQuery};
use crate::domain::{AccountId, DailyRecord, DayKeyResolver, Error};

/// Trailing window used when the caller does not supply one.
pub const DEFAULT_HISTORY_WINDOW_DAYS: u32 = 7;
/// Largest trailing window a caller may request.
pub const MAX_HISTORY_WINDOW_DAYS: u32 = 31;

/// History reader implementing [`WaterHistoryQuery`].
#[derive(Clone)]
pub struct WaterHistoryService<R> {
    records: Arc<R>,
    resolver: DayKeyResolver,
    default_window_days: u32,
}

impl<R> WaterHistoryService<R> {
    /// Create a reader with the default seven-day window.
    pub fn new(records: Arc<R>, resolver: DayKeyResolver) -> Self {
        Self {
            records,
            resolver,
            default_window_days: DEFAULT_HISTORY_WINDOW_DAYS,
        }
    }

    /// Override the window applied when callers omit one.
    ///
    /// Values outside `1..=MAX_HISTORY_WINDOW_DAYS` are clamped.
    #[must_use]
    pub fn with_default_window(mut self, days: u32) -> Self {
        self.default_window_days = days.clamp(1, MAX_HISTORY_WINDOW_DAYS);
        self
    }
}

fn validate_window(days: u32) -> Result<u32, Error> {
    if (1..=MAX_HISTORY_WINDOW_DAYS).contains(&days) {
        return Ok(days);
    }
    Err(Error::invalid_request(format!(
        "days must be between 1 and {MAX_HISTORY_WINDOW_DAYS}"
    ))
    .with_details(json!({
        "field": "days",
        "value": days,
        "code": "invalid_window",
    })))
}

#[async_trait]
impl<R> WaterHistoryQuery for WaterHistoryService<R>
where
    R: DailyRecordRepository,
{
    async fn recent_history(
        &self,
        account_id: &AccountId,
        window_days: Option<u32>,
    ) -> Result<Vec<DailyRecord>, Error> {
        let days = validate_window(window_days.unwrap_or(self.default_window_days))?;
        let today = self.resolver.today();
        let from = today.previous_days(days);
        self.records
            .query_range(account_id, from, today)
            .await
            .map_err(map_record_error)
    }

    async fn all_history(&self, account_id: &AccountId) -> Result<Vec<DailyRecord>, Error> {
        self.records
            .query_all(account_id)
            .await
            .map_err(map_record_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{DailyRecordRepositoryError, MockDailyRecordRepository};
    use crate::domain::{DayKey, ErrorCode};
    use crate::test_support::{MutableClock, utc_instant, utc_resolver};
    use mockall::predicate::eq;
    use rstest::rstest;

    fn key(raw: &str) -> DayKey {
        raw.parse().expect("valid day key")
    }

    fn service(repo: MockDailyRecordRepository) -> WaterHistoryService<MockDailyRecordRepository> {
        let clock = Arc::new(MutableClock::new(utc_instant(2024, 7, 3, 8, 0)));
        WaterHistoryService::new(Arc::new(repo), utc_resolver(clock))
    }

    #[rstest]
    #[case(None, "2024-06-26")]
    #[case(Some(1), "2024-07-02")]
    #[case(Some(31), "2024-06-02")]
    #[tokio::test]
    async fn recent_history_queries_trailing_window(
        #[case] window: Option<u32>,
        #[case] from: &str,
    ) {
        let account_id = AccountId::random();
        let mut repo = MockDailyRecordRepository::new();
        repo.expect_query_range()
            .with(eq(account_id), eq(key(from)), eq(key("2024-07-03")))
            .times(1)
            .return_once(|_, _, _| Ok(Vec::new()));

        let records = service(repo)
            .recent_history(&account_id, window)
            .await
            .expect("history");
        assert!(records.is_empty());
    }

    #[rstest]
    #[case(0)]
    #[case(32)]
    #[tokio::test]
    async fn recent_history_rejects_out_of_range_windows(#[case] window: u32) {
        let mut repo = MockDailyRecordRepository::new();
        repo.expect_query_range().never();

        let error = service(repo)
            .recent_history(&AccountId::random(), Some(window))
            .await
            .expect_err("invalid window");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.details().expect("details")["field"], "days");
    }

    #[rstest]
    #[tokio::test]
    async fn configured_default_window_applies() {
        let account_id = AccountId::random();
        let mut repo = MockDailyRecordRepository::new();
        repo.expect_query_range()
            .with(eq(account_id), eq(key("2024-06-30")), eq(key("2024-07-03")))
            .times(1)
            .return_once(|_, _, _| Ok(Vec::new()));

        service(repo)
            .with_default_window(3)
            .recent_history(&account_id, None)
            .await
            .expect("history");
    }

    #[rstest]
    #[tokio::test]
    async fn all_history_maps_store_outages() {
        let mut repo = MockDailyRecordRepository::new();
        repo.expect_query_all()
            .times(1)
            .return_once(|_| Err(DailyRecordRepositoryError::connection("down")));

        let error = service(repo)
            .all_history(&AccountId::random())
            .await
            .expect_err("outage");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
