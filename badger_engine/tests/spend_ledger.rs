use badger_engine::{db_types::MinorUnits, traits::SpendLedger};
use chrono::NaiveDate;
use futures_util::future::join_all;

mod support;
use support::prepare_env::{prepare_test_env, random_db_path, tear_down};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, d).unwrap()
}

fn pence(v: i64) -> MinorUnits {
    MinorUnits::from(v)
}

#[tokio::test]
async fn reserve_up_to_the_cap() {
    let db = prepare_test_env(&random_db_path()).await;
    let cap = pence(10_000);
    assert_eq!(db.fetch_committed(day(1)).await.unwrap(), MinorUnits::ZERO);
    assert!(db.fetch_spend_record(day(1)).await.unwrap().is_none());

    let r = db.reserve(day(1), pence(6_000), cap).await.unwrap();
    assert!(r.ok);
    assert_eq!(r.new_total, pence(6_000));
    let r = db.reserve(day(1), pence(4_000), cap).await.unwrap();
    assert!(r.ok);
    assert_eq!(r.new_total, cap);
    let r = db.reserve(day(1), pence(1), cap).await.unwrap();
    assert!(!r.ok);
    assert_eq!(r.new_total, cap);
    // Zero-value orders always fit
    assert!(db.reserve(day(1), MinorUnits::ZERO, cap).await.unwrap().ok);

    let record = db.fetch_spend_record(day(1)).await.unwrap().unwrap();
    assert_eq!(record.committed, cap);
    assert_eq!(record.spend_date, day(1));
    tear_down(db).await;
}

#[tokio::test]
async fn oversized_first_reservation_creates_nothing() {
    let db = prepare_test_env(&random_db_path()).await;
    let r = db.reserve(day(2), pence(10_001), pence(10_000)).await.unwrap();
    assert!(!r.ok);
    assert_eq!(r.new_total, MinorUnits::ZERO);
    assert!(db.fetch_spend_record(day(2)).await.unwrap().is_none());
    tear_down(db).await;
}

#[tokio::test]
async fn days_are_independent() {
    let db = prepare_test_env(&random_db_path()).await;
    let cap = pence(10_000);
    assert!(db.reserve(day(3), pence(9_000), cap).await.unwrap().ok);
    assert!(db.reserve(day(4), pence(9_000), cap).await.unwrap().ok);
    assert_eq!(db.fetch_committed(day(3)).await.unwrap(), pence(9_000));
    assert_eq!(db.fetch_committed(day(4)).await.unwrap(), pence(9_000));
    tear_down(db).await;
}

#[tokio::test]
async fn release_never_goes_negative() {
    let db = prepare_test_env(&random_db_path()).await;
    let cap = pence(10_000);
    assert!(db.reserve(day(5), pence(2_500), cap).await.unwrap().ok);
    assert_eq!(db.release(day(5), pence(500)).await.unwrap(), pence(2_000));
    // A reset in between a reserve and its release must not drive the total below zero
    db.reset(day(5)).await.unwrap();
    assert_eq!(db.release(day(5), pence(2_000)).await.unwrap(), MinorUnits::ZERO);
    // Releasing against a day with no record is a no-op
    assert_eq!(db.release(day(6), pence(100)).await.unwrap(), MinorUnits::ZERO);
    assert!(db.fetch_spend_record(day(6)).await.unwrap().is_none());
    tear_down(db).await;
}

#[tokio::test]
async fn reset_creates_and_zeroes() {
    let db = prepare_test_env(&random_db_path()).await;
    db.reset(day(7)).await.unwrap();
    let record = db.fetch_spend_record(day(7)).await.unwrap().unwrap();
    assert_eq!(record.committed, MinorUnits::ZERO);
    assert!(db.reserve(day(7), pence(7_500), pence(10_000)).await.unwrap().ok);
    db.reset(day(7)).await.unwrap();
    assert_eq!(db.fetch_committed(day(7)).await.unwrap(), MinorUnits::ZERO);
    assert!(db.reserve(day(7), pence(10_000), pence(10_000)).await.unwrap().ok);
    tear_down(db).await;
}

#[tokio::test]
async fn concurrent_reservations_never_exceed_the_cap() {
    let db = prepare_test_env(&random_db_path()).await;
    let cap = pence(10_000);
    let attempts = (0..50).map(|_| db.reserve(day(8), pence(300), cap));
    let results = join_all(attempts).await.into_iter().map(|r| r.unwrap()).collect::<Vec<_>>();
    let accepted = results.iter().filter(|r| r.ok).count();
    assert_eq!(accepted, 33);
    assert!(results.iter().all(|r| r.new_total <= cap));
    assert_eq!(db.fetch_committed(day(8)).await.unwrap(), pence(9_900));
    tear_down(db).await;
}
