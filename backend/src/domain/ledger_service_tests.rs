//! Tests for the water ledger service.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockDailyRecordRepository, MockLedgerMetrics};
use crate::domain::ErrorCode;
use crate::test_support::{MutableClock, utc_instant, utc_resolver};

fn now() -> DateTime<Utc> {
    utc_instant(2024, 6, 30, 9, 15)
}

fn today() -> DayKey {
    "2024-06-30".parse().expect("valid day key")
}

#[fixture]
fn account_id() -> AccountId {
    AccountId::random()
}

fn service(repo: MockDailyRecordRepository) -> WaterLedgerService<MockDailyRecordRepository> {
    let clock = Arc::new(MutableClock::new(now()));
    WaterLedgerService::new(Arc::new(repo), utc_resolver(clock))
}

fn stored(account_id: AccountId, revision: u32) -> DailyRecord {
    let mut record = DailyRecord::open(account_id, today(), now());
    for _ in 0..revision {
        record.advance_revision(now());
    }
    record
}

fn amount(ml: i64) -> IntakeAmount {
    IntakeAmount::new(ml).expect("valid amount")
}

#[rstest]
#[tokio::test]
async fn get_or_create_returns_existing_record(account_id: AccountId) {
    let existing = stored(account_id, 3);
    let expected = existing.clone();
    let mut repo = MockDailyRecordRepository::new();
    repo.expect_find()
        .with(eq(account_id), eq(today()))
        .times(1)
        .return_once(move |_, _| Ok(Some(existing)));
    repo.expect_save().never();

    let record = service(repo)
        .get_or_create_today(&account_id)
        .await
        .expect("record");
    assert_eq!(record, expected);
}

#[rstest]
#[tokio::test]
async fn get_or_create_inserts_defaults(account_id: AccountId) {
    let mut repo = MockDailyRecordRepository::new();
    repo.expect_find().times(1).return_once(|_, _| Ok(None));
    repo.expect_save()
        .withf(|record, expected| {
            expected.is_none()
                && record.revision() == 1
                && record.total_milliliters() == 0
                && record.entries().is_empty()
        })
        .times(1)
        .return_once(|_, _| Ok(()));

    let record = service(repo)
        .get_or_create_today(&account_id)
        .await
        .expect("record");
    assert_eq!(record.day_key(), today());
    assert!((record.goal().liters() - 3.0).abs() < f64::EPSILON);
}

#[rstest]
#[tokio::test]
async fn get_or_create_adopts_winner_after_insert_race(account_id: AccountId) {
    let winner = stored(account_id, 1);
    let expected = winner.clone();
    let mut repo = MockDailyRecordRepository::new();
    let mut seq = mockall::Sequence::new();
    repo.expect_find()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_, _| Ok(None));
    repo.expect_save()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_, _| Err(DailyRecordRepositoryError::conflict("duplicate day")));
    repo.expect_find()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(move |_, _| Ok(Some(winner)));

    let record = service(repo)
        .get_or_create_today(&account_id)
        .await
        .expect("record");
    assert_eq!(record, expected);
}

#[rstest]
#[case(-1)]
#[case(-500)]
#[tokio::test]
async fn add_intake_rejects_negative_amounts(account_id: AccountId, #[case] ml: i64) {
    let mut repo = MockDailyRecordRepository::new();
    repo.expect_find().never();
    repo.expect_save().never();

    let error = service(repo)
        .add_intake(&account_id, ml, None)
        .await
        .expect_err("negative amount");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let details = error.details().expect("details");
    assert_eq!(details["code"], "invalid_amount");
    assert_eq!(details["field"], "amount");
    assert_eq!(details["value"], ml);
}

#[rstest]
#[tokio::test]
async fn add_intake_accepts_zero(account_id: AccountId) {
    let mut repo = MockDailyRecordRepository::new();
    repo.expect_find().times(1).return_once(|_, _| Ok(None));
    repo.expect_save().times(1).return_once(|_, _| Ok(()));

    let record = service(repo)
        .add_intake(&account_id, 0, None)
        .await
        .expect("zero accepted");
    assert_eq!(record.entries().len(), 1);
    assert_eq!(record.total_milliliters(), 0);
}

#[rstest]
#[tokio::test]
async fn add_intake_rejects_amounts_above_the_cap(account_id: AccountId) {
    let mut repo = MockDailyRecordRepository::new();
    repo.expect_find().never();
    repo.expect_save().never();

    let error = service(repo)
        .add_intake(&account_id, i64::MAX, None)
        .await
        .expect_err("oversized amount");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let details = error.details().expect("details");
    assert_eq!(details["code"], "invalid_amount");
    assert_eq!(details["value"], i64::MAX);
}

#[rstest]
#[case(-1)]
#[case(-250)]
#[tokio::test]
async fn remove_amount_rejects_negative_amounts(account_id: AccountId, #[case] ml: i64) {
    let mut repo = MockDailyRecordRepository::new();
    repo.expect_find().never();
    repo.expect_save().never();

    let error = service(repo)
        .remove_amount(&account_id, ml)
        .await
        .expect_err("negative amount");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let details = error.details().expect("details");
    assert_eq!(details["code"], "invalid_amount");
    assert_eq!(details["field"], "amount");
    assert_eq!(details["value"], ml);
}

#[rstest]
#[tokio::test]
async fn remove_amount_accepts_zero(account_id: AccountId) {
    let mut repo = MockDailyRecordRepository::new();
    repo.expect_find().times(1).return_once(|_, _| Ok(None));
    repo.expect_save().times(1).return_once(|_, _| Ok(()));

    let record = service(repo)
        .remove_amount(&account_id, 0)
        .await
        .expect("zero accepted");
    assert_eq!(record.entries().len(), 1);
    assert_eq!(record.entries()[0].amount_milliliters, 0);
    assert_eq!(record.total_milliliters(), 0);
}

#[rstest]
#[tokio::test]
async fn add_intake_saves_with_read_revision(account_id: AccountId) {
    let existing = stored(account_id, 4);
    let mut repo = MockDailyRecordRepository::new();
    repo.expect_find()
        .times(1)
        .return_once(move |_, _| Ok(Some(existing)));
    repo.expect_save()
        .withf(|record, expected| *expected == Some(4) && record.revision() == 5)
        .times(1)
        .return_once(|_, _| Ok(()));

    let record = service(repo)
        .add_intake(&account_id, 250, Some("morning".to_owned()))
        .await
        .expect("saved");
    assert_eq!(record.total_milliliters(), 250);
    assert_eq!(record.entries()[0].note, "morning");
    assert_eq!(record.entries()[0].recorded_at, now());
}

#[rstest]
#[tokio::test]
async fn conflict_is_retried_once_against_a_fresh_read(account_id: AccountId) {
    let first_read = stored(account_id, 1);
    let mut second_read = stored(account_id, 2);
    second_read.append_intake(amount(100), None, now());

    let mut repo = MockDailyRecordRepository::new();
    let mut seq = mockall::Sequence::new();
    repo.expect_find()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(move |_, _| Ok(Some(first_read)));
    repo.expect_save()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_, _| Err(DailyRecordRepositoryError::conflict("revision moved")));
    repo.expect_find()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(move |_, _| Ok(Some(second_read)));
    repo.expect_save()
        .withf(|_, expected| *expected == Some(2))
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_, _| Ok(()));

    let mut metrics = MockLedgerMetrics::new();
    metrics
        .expect_record_write()
        .with(eq("add_intake"), eq(LedgerWriteOutcome::CommittedAfterRetry))
        .times(1)
        .return_const(());

    let record = service(repo)
        .with_metrics(Arc::new(metrics))
        .add_intake(&account_id, 100, None)
        .await
        .expect("retry succeeds");
    assert_eq!(record.total_milliliters(), 200);
    assert_eq!(record.entries().len(), 2);
    assert_eq!(record.revision(), 3);
}

#[rstest]
#[tokio::test]
async fn second_conflict_surfaces_as_write_conflict(account_id: AccountId) {
    let mut repo = MockDailyRecordRepository::new();
    repo.expect_find()
        .times(2)
        .returning(move |_, _| Ok(Some(stored(account_id, 1))));
    repo.expect_save()
        .times(2)
        .returning(|_, _| Err(DailyRecordRepositoryError::conflict("revision moved")));

    let mut metrics = MockLedgerMetrics::new();
    metrics
        .expect_record_write()
        .with(eq("remove_amount"), eq(LedgerWriteOutcome::ConflictExhausted))
        .times(1)
        .return_const(());

    let error = service(repo)
        .with_metrics(Arc::new(metrics))
        .remove_amount(&account_id, 100)
        .await
        .expect_err("conflict persists");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(
        error.details().and_then(|d| d.get("code")),
        Some(&serde_json::json!("write_conflict"))
    );
}

#[rstest]
#[case(DailyRecordRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(DailyRecordRepositoryError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn store_failures_map_to_domain_errors(
    account_id: AccountId,
    #[case] failure: DailyRecordRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockDailyRecordRepository::new();
    repo.expect_find()
        .times(1)
        .return_once(move |_, _| Err(failure));

    let error = service(repo)
        .get_or_create_today(&account_id)
        .await
        .expect_err("store failure");
    assert_eq!(error.code(), expected);
}

#[rstest]
#[case(DailyRecordRepositoryError::connection("pool exhausted"), ErrorCode::ServiceUnavailable)]
#[case(DailyRecordRepositoryError::query("constraint"), ErrorCode::InternalError)]
#[tokio::test]
async fn failed_saves_are_counted(
    account_id: AccountId,
    #[case] failure: DailyRecordRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockDailyRecordRepository::new();
    repo.expect_find()
        .times(1)
        .return_once(move |_, _| Ok(Some(stored(account_id, 1))));
    repo.expect_save()
        .times(1)
        .return_once(move |_, _| Err(failure));

    let mut metrics = MockLedgerMetrics::new();
    metrics
        .expect_record_write()
        .with(eq("set_goal"), eq(LedgerWriteOutcome::StoreFailed))
        .times(1)
        .return_const(());

    let error = service(repo)
        .with_metrics(Arc::new(metrics))
        .set_goal(&account_id, 2.0)
        .await
        .expect_err("store failure");
    assert_eq!(error.code(), expected);
}

#[rstest]
#[tokio::test]
async fn remove_entry_by_id_reports_missing_entries(account_id: AccountId) {
    let mut repo = MockDailyRecordRepository::new();
    repo.expect_find_by_entry_id()
        .times(1)
        .return_once(|_, _| Ok(None));
    repo.expect_save().never();

    let error = service(repo)
        .remove_entry_by_id(&account_id, EntryId::random())
        .await
        .expect_err("missing entry");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn remove_entry_by_id_updates_owning_record(account_id: AccountId) {
    let mut existing = stored(account_id, 1);
    let entry = existing.append_intake(amount(1000), None, now());
    let entry_id = entry.id;
    let mut repo = MockDailyRecordRepository::new();
    repo.expect_find_by_entry_id()
        .with(eq(account_id), eq(entry_id))
        .times(1)
        .return_once(move |_, _| Ok(Some(existing)));
    repo.expect_save().times(1).return_once(|_, _| Ok(()));

    let record = service(repo)
        .remove_entry_by_id(&account_id, entry_id)
        .await
        .expect("removed");
    assert!(record.entries().is_empty());
    assert_eq!(record.total_milliliters(), 0);
}

#[rstest]
#[case(0.0)]
#[case(-2.0)]
#[case(f64::NAN)]
#[tokio::test]
async fn set_goal_rejects_non_positive_goals(account_id: AccountId, #[case] goal: f64) {
    let mut repo = MockDailyRecordRepository::new();
    repo.expect_find().never();

    let error = service(repo)
        .set_goal(&account_id, goal)
        .await
        .expect_err("invalid goal");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.details().expect("details")["field"], "goal");
}

#[rstest]
#[tokio::test]
async fn set_goal_keeps_total(account_id: AccountId) {
    let mut existing = stored(account_id, 1);
    existing.append_intake(amount(750), None, now());
    let mut repo = MockDailyRecordRepository::new();
    repo.expect_find()
        .times(1)
        .return_once(move |_, _| Ok(Some(existing)));
    repo.expect_save().times(1).return_once(|_, _| Ok(()));

    let record = service(repo)
        .set_goal(&account_id, 2.0)
        .await
        .expect("goal set");
    assert!((record.goal().liters() - 2.0).abs() < f64::EPSILON);
    assert_eq!(record.total_milliliters(), 750);
}

#[rstest]
#[tokio::test]
async fn set_amount_for_date_requires_existing_record(account_id: AccountId) {
    let day: DayKey = "2024-06-01".parse().expect("valid day key");
    let mut repo = MockDailyRecordRepository::new();
    repo.expect_find()
        .with(eq(account_id), eq(day))
        .times(1)
        .return_once(|_, _| Ok(None));
    repo.expect_save().never();

    let error = service(repo)
        .set_amount_for_date(&account_id, day, 500)
        .await
        .expect_err("no record");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn set_amount_for_date_overrides_total_only(account_id: AccountId) {
    let mut existing = stored(account_id, 1);
    existing.append_intake(amount(250), None, now());
    let mut repo = MockDailyRecordRepository::new();
    repo.expect_find()
        .times(1)
        .return_once(move |_, _| Ok(Some(existing)));
    repo.expect_save().times(1).return_once(|_, _| Ok(()));

    let record = service(repo)
        .set_amount_for_date(&account_id, today(), 1200)
        .await
        .expect("overridden");
    assert_eq!(record.total_milliliters(), 1200);
    assert_eq!(record.entries().len(), 1);
    assert!(!record.is_consistent());
}

#[rstest]
#[tokio::test]
async fn set_amount_by_id_recomputes_total(account_id: AccountId) {
    let mut existing = stored(account_id, 1);
    let first = existing.append_intake(amount(250), None, now());
    existing.append_intake(amount(500), None, now());
    let mut repo = MockDailyRecordRepository::new();
    repo.expect_find_by_entry_id()
        .times(1)
        .return_once(move |_, _| Ok(Some(existing)));
    repo.expect_save().times(1).return_once(|_, _| Ok(()));

    let record = service(repo)
        .set_amount_by_id(&account_id, first.id, 100)
        .await
        .expect("edited");
    assert_eq!(record.total_milliliters(), 600);
    assert!(record.is_consistent());
}

#[rstest]
#[tokio::test]
async fn reset_without_record_writes_nothing(account_id: AccountId) {
    let mut repo = MockDailyRecordRepository::new();
    repo.expect_find().times(1).return_once(|_, _| Ok(None));
    repo.expect_save().never();

    let outcome = service(repo)
        .reset_today(&account_id)
        .await
        .expect("reset");
    assert_eq!(outcome, ResetOutcome::AlreadyReset);
}

#[rstest]
#[tokio::test]
async fn reset_clears_entries_and_keeps_goal(account_id: AccountId) {
    let mut existing = stored(account_id, 2);
    existing.set_goal(GoalLiters::new(2.5).expect("valid goal"));
    existing.append_intake(amount(900), None, now());
    let reads = Arc::new(Mutex::new(Some(existing)));
    let mut repo = MockDailyRecordRepository::new();
    repo.expect_find().times(2).returning(move |_, _| {
        let guard = reads.lock().expect("reads lock");
        Ok(guard.clone())
    });
    repo.expect_save()
        .withf(|_, expected| *expected == Some(2))
        .times(1)
        .return_once(|_, _| Ok(()));

    let outcome = service(repo)
        .reset_today(&account_id)
        .await
        .expect("reset");
    let ResetOutcome::Reset(record) = outcome else {
        panic!("expected a reset record, got {outcome:?}");
    };
    assert!(record.entries().is_empty());
    assert_eq!(record.total_milliliters(), 0);
    assert!((record.goal().liters() - 2.5).abs() < f64::EPSILON);
}
