use chrono::NaiveDate;
use log::*;
use sqlx::SqliteConnection;

use crate::db_types::{MinorUnits, SpendRecord};

pub async fn fetch_spend_record(day: NaiveDate, conn: &mut SqliteConnection) -> Result<Option<SpendRecord>, sqlx::Error> {
    let record =
        sqlx::query_as("SELECT * FROM daily_spend WHERE spend_date = $1").bind(day).fetch_optional(conn).await?;
    Ok(record)
}

pub async fn fetch_committed(day: NaiveDate, conn: &mut SqliteConnection) -> Result<MinorUnits, sqlx::Error> {
    let committed: Option<i64> = sqlx::query_scalar("SELECT committed FROM daily_spend WHERE spend_date = $1")
        .bind(day)
        .fetch_optional(conn)
        .await?;
    Ok(committed.map(MinorUnits::from).unwrap_or_default())
}

/// Atomically adds `delta` to the committed spend for `day`, provided the result stays within `cap`.
///
/// The check and the write happen in one upsert statement, so two concurrent reservations can never both pass the
/// check against the same starting total. For a new day the `SELECT .. WHERE` guards the insert; for an existing day
/// the `DO UPDATE .. WHERE` clause guards the increment. Either way, no row is returned when the cap would be breached.
///
/// Returns the new committed total, or `None` if the reservation was refused.
pub async fn try_reserve(
    day: NaiveDate,
    delta: MinorUnits,
    cap: MinorUnits,
    conn: &mut SqliteConnection,
) -> Result<Option<MinorUnits>, sqlx::Error> {
    let total: Option<i64> = sqlx::query_scalar(
        r#"
            INSERT INTO daily_spend (spend_date, committed)
            SELECT $1, $2 WHERE $2 <= $3
            ON CONFLICT(spend_date) DO UPDATE SET
                committed = committed + excluded.committed,
                updated_at = CURRENT_TIMESTAMP
            WHERE daily_spend.committed + excluded.committed <= $3
            RETURNING committed;
        "#,
    )
    .bind(day)
    .bind(delta.value())
    .bind(cap.value())
    .fetch_optional(conn)
    .await?;
    trace!("🗃️ Reservation of {delta} against cap {cap} on {day}: {total:?}");
    Ok(total.map(MinorUnits::from))
}

/// Atomically subtracts `delta` from the committed spend for `day`, clamping at zero.
/// Returns the new total (zero if the day has no record).
pub async fn release(day: NaiveDate, delta: MinorUnits, conn: &mut SqliteConnection) -> Result<MinorUnits, sqlx::Error> {
    let total: Option<i64> = sqlx::query_scalar(
        r#"
            UPDATE daily_spend SET
                committed = MAX(committed - $2, 0),
                updated_at = CURRENT_TIMESTAMP
            WHERE spend_date = $1
            RETURNING committed;
        "#,
    )
    .bind(day)
    .bind(delta.value())
    .fetch_optional(conn)
    .await?;
    Ok(total.map(MinorUnits::from).unwrap_or_default())
}

pub async fn reset(day: NaiveDate, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO daily_spend (spend_date, committed) VALUES ($1, 0)
            ON CONFLICT(spend_date) DO UPDATE SET committed = 0, updated_at = CURRENT_TIMESTAMP;
        "#,
    )
    .bind(day)
    .execute(conn)
    .await?;
    Ok(())
}
