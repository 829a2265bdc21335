//! Builders for the HTTP state from configured storage adapters.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use waterlog::domain::ports::{
    AccountCommand, AccountStore, DailyRecordRepository, LedgerMetrics, WaterHistoryQuery,
    WaterLedgerCommand,
};
use waterlog::domain::{
    AccountService, DayBoundary, DayKeyResolver, WaterHistoryService, WaterLedgerService,
};
use waterlog::inbound::http::state::HttpState;
use waterlog::outbound::memory::{InMemoryAccountStore, InMemoryDailyRecordRepository};
use waterlog::outbound::persistence::{DbPool, DieselAccountStore, DieselDailyRecordRepository};

use super::ServerConfig;

/// Ledger tuning shared by every storage choice.
#[derive(Clone, Copy)]
struct LedgerOptions {
    day_boundary: DayBoundary,
    history_window_days: u32,
}

fn build_ports<R, S>(
    records: Arc<R>,
    accounts: Arc<S>,
    options: LedgerOptions,
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn LedgerMetrics>,
) -> HttpState
where
    R: DailyRecordRepository + 'static,
    S: AccountStore + 'static,
{
    let resolver = DayKeyResolver::new(options.day_boundary, clock);
    let ledger: Arc<dyn WaterLedgerCommand> = Arc::new(
        WaterLedgerService::new(records.clone(), resolver.clone()).with_metrics(metrics),
    );
    let history: Arc<dyn WaterHistoryQuery> = Arc::new(
        WaterHistoryService::new(records, resolver)
            .with_default_window(options.history_window_days),
    );
    let accounts: Arc<dyn AccountCommand> = Arc::new(AccountService::new(accounts));
    HttpState::new(ledger, history, accounts)
}

fn build_for_pool(
    pool: Option<&DbPool>,
    options: LedgerOptions,
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn LedgerMetrics>,
) -> HttpState {
    match pool {
        Some(pool) => build_ports(
            Arc::new(DieselDailyRecordRepository::new(pool.clone())),
            Arc::new(DieselAccountStore::new(pool.clone())),
            options,
            clock,
            metrics,
        ),
        None => build_ports(
            Arc::new(InMemoryDailyRecordRepository::new()),
            Arc::new(InMemoryAccountStore::new()),
            options,
            clock,
            metrics,
        ),
    }
}

/// Build the shared HTTP state, choosing Diesel adapters when a pool is
/// configured and in-memory stores otherwise.
pub(super) fn build_http_state(
    config: &ServerConfig,
    metrics: Arc<dyn LedgerMetrics>,
) -> web::Data<HttpState> {
    let options = LedgerOptions {
        day_boundary: config.day_boundary,
        history_window_days: config.history_window_days,
    };
    web::Data::new(build_for_pool(
        config.db_pool.as_ref(),
        options,
        Arc::new(DefaultClock),
        metrics,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use waterlog::domain::AccountId;
    use waterlog::domain::ports::NoOpLedgerMetrics;
    use waterlog::test_support::{MutableClock, utc_instant};

    fn in_memory_state(history_window_days: u32) -> HttpState {
        let clock = Arc::new(MutableClock::new(utc_instant(2024, 6, 30, 9, 0)));
        build_for_pool(
            None,
            LedgerOptions {
                day_boundary: DayBoundary::Utc,
                history_window_days,
            },
            clock,
            Arc::new(NoOpLedgerMetrics),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn missing_pool_selects_in_memory_ledger() {
        let state = in_memory_state(7);
        let account = AccountId::random();

        let record = state
            .ledger
            .add_intake(&account, 300, None)
            .await
            .expect("in-memory add");
        assert_eq!(record.total_milliliters(), 300);
        assert_eq!(record.day_key().to_string(), "2024-06-30");

        let recent = state
            .history
            .recent_history(&account, None)
            .await
            .expect("history");
        assert_eq!(recent.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn ledger_and_history_share_one_store() {
        let state = in_memory_state(1);
        let account = AccountId::random();
        state
            .ledger
            .get_or_create_today(&account)
            .await
            .expect("today");

        let all = state.history.all_history(&account).await.expect("all");
        assert_eq!(all.len(), 1);
    }
}
