//! Behaviour tests for the daily water ledger.
//!
//! Scenarios drive the ledger and history services over the in-memory store
//! with a controllable clock, so day rollover is deterministic.

use std::cell::RefCell;
use std::sync::Arc;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tokio::runtime::Runtime;
use waterlog::domain::ports::{WaterHistoryQuery, WaterLedgerCommand};
use waterlog::domain::{
    AccountId, DailyRecord, Error, ErrorCode, WaterHistoryService, WaterLedgerService,
};
use waterlog::outbound::memory::InMemoryDailyRecordRepository;
use waterlog::test_support::{MutableClock, utc_instant, utc_resolver};

type Ledger = WaterLedgerService<InMemoryDailyRecordRepository>;
type History = WaterHistoryService<InMemoryDailyRecordRepository>;

struct LedgerWorld {
    runtime: Runtime,
    clock: Arc<MutableClock>,
    account: AccountId,
    services: RefCell<Option<(Arc<Ledger>, Arc<History>)>>,
    last_error: RefCell<Option<Error>>,
}

impl LedgerWorld {
    fn new() -> Self {
        Self {
            runtime: Runtime::new().expect("create runtime"),
            clock: Arc::new(MutableClock::new(utc_instant(2024, 6, 30, 9, 0))),
            account: AccountId::random(),
            services: RefCell::new(None),
            last_error: RefCell::new(None),
        }
    }

    fn install(&self) {
        let records = Arc::new(InMemoryDailyRecordRepository::new());
        let ledger = WaterLedgerService::new(records.clone(), utc_resolver(self.clock.clone()));
        let history = WaterHistoryService::new(records, utc_resolver(self.clock.clone()));
        *self.services.borrow_mut() = Some((Arc::new(ledger), Arc::new(history)));
    }

    fn ledger(&self) -> Arc<Ledger> {
        self.services
            .borrow()
            .as_ref()
            .map(|(ledger, _)| ledger.clone())
            .expect("ledger installed")
    }

    fn history(&self) -> Arc<History> {
        self.services
            .borrow()
            .as_ref()
            .map(|(_, history)| history.clone())
            .expect("history installed")
    }

    fn capture(&self, result: Result<DailyRecord, Error>) {
        *self.last_error.borrow_mut() = result.err();
    }

    fn today(&self) -> DailyRecord {
        let ledger = self.ledger();
        self.runtime
            .block_on(ledger.get_or_create_today(&self.account))
            .expect("today's record")
    }
}

#[fixture]
fn world() -> LedgerWorld {
    LedgerWorld::new()
}

#[given("a ledger with a UTC day boundary")]
fn a_ledger_with_a_utc_day_boundary(world: &LedgerWorld) {
    world.install();
}

#[when("the account adds {amount} millilitres")]
fn the_account_adds(world: &LedgerWorld, amount: i64) {
    let ledger = world.ledger();
    let result = world
        .runtime
        .block_on(ledger.add_intake(&world.account, amount, None));
    world.capture(result);
}

#[when("the account removes the last entry")]
fn the_account_removes_the_last_entry(world: &LedgerWorld) {
    let entry_id = world
        .today()
        .entries()
        .last()
        .map(|entry| entry.id)
        .expect("an entry to remove");
    let ledger = world.ledger();
    let result = world
        .runtime
        .block_on(ledger.remove_entry_by_id(&world.account, entry_id));
    world.capture(result);
}

#[when("the account removes an amount of {amount} millilitres")]
fn the_account_removes_an_amount(world: &LedgerWorld, amount: i64) {
    let ledger = world.ledger();
    let result = world
        .runtime
        .block_on(ledger.remove_amount(&world.account, amount));
    world.capture(result);
}

#[when("the clock advances by {days} days")]
fn the_clock_advances(world: &LedgerWorld, days: i64) {
    world.clock.advance_days(days);
}

#[when("the account sets the goal to {goal} litres")]
fn the_account_sets_the_goal(world: &LedgerWorld, goal: f64) {
    let ledger = world.ledger();
    let result = world.runtime.block_on(ledger.set_goal(&world.account, goal));
    world.capture(result);
}

#[when("the account resets today")]
fn the_account_resets_today(world: &LedgerWorld) {
    let ledger = world.ledger();
    world
        .runtime
        .block_on(ledger.reset_today(&world.account))
        .expect("reset succeeds");
}

#[then("today's total is {amount} millilitres")]
fn todays_total_is(world: &LedgerWorld, amount: i64) {
    let today = world.today();
    assert_eq!(today.total_milliliters(), amount);
    assert!(today.is_consistent());
}

#[then("today's record has {count} entries")]
fn todays_record_has_entries(world: &LedgerWorld, count: usize) {
    assert_eq!(world.today().entries().len(), count);
}

#[then("the last entry amount is {amount} millilitres")]
fn the_last_entry_amount_is(world: &LedgerWorld, amount: i64) {
    let today = world.today();
    let last = today.entries().last().expect("an entry");
    assert_eq!(last.amount_milliliters, amount);
}

#[then("the history holds {count} records")]
fn the_history_holds_records(world: &LedgerWorld, count: usize) {
    let history = world.history();
    let records = world
        .runtime
        .block_on(history.all_history(&world.account))
        .expect("history");
    assert_eq!(records.len(), count);
    let days: Vec<String> = records.iter().map(|r| r.day_key().to_string()).collect();
    let mut sorted = days.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(days, sorted, "history should be newest first");
}

#[then("the progress is {percent} percent")]
fn the_progress_is(world: &LedgerWorld, percent: u8) {
    assert_eq!(world.today().progress_percent(), percent);
}

#[then("the remaining amount is {amount} millilitres")]
fn the_remaining_amount_is(world: &LedgerWorld, amount: i64) {
    assert_eq!(world.today().remaining_milliliters(), amount);
}

#[then("today's goal is {goal} litres")]
fn todays_goal_is(world: &LedgerWorld, goal: f64) {
    let actual = world.today().goal().liters();
    assert!((actual - goal).abs() < f64::EPSILON, "goal was {actual}");
}

#[then("the ledger rejects the request as invalid")]
fn the_ledger_rejects_the_request(world: &LedgerWorld) {
    let error = world.last_error.borrow();
    let error = error.as_ref().expect("an error");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let code = error.details().and_then(|details| details.get("code"));
    assert_eq!(code.and_then(|c| c.as_str()), Some("invalid_amount"));
    assert!(world.today().entries().is_empty());
}

#[scenario(
    path = "tests/features/water_ledger.feature",
    name = "Intake accumulates on today's record"
)]
fn intake_accumulates(world: LedgerWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/water_ledger.feature",
    name = "Removing an entry subtracts its amount"
)]
fn removing_an_entry(world: LedgerWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/water_ledger.feature",
    name = "Removing an amount records a negative entry"
)]
fn removing_an_amount(world: LedgerWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/water_ledger.feature",
    name = "Midnight starts a new record"
)]
fn midnight_rollover(world: LedgerWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/water_ledger.feature",
    name = "Progress is capped at one hundred percent"
)]
fn progress_is_capped(world: LedgerWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/water_ledger.feature",
    name = "Reset clears intake but keeps the goal"
)]
fn reset_keeps_goal(world: LedgerWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/water_ledger.feature",
    name = "Negative intake is rejected"
)]
fn negative_intake_rejected(world: LedgerWorld) {
    drop(world);
}
