use chrono::NaiveDate;
use thiserror::Error;

use crate::db_types::{MinorUnits, Reservation, SpendRecord};

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("A record that should exist was not found. {0}")]
    RecordMissing(String),
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::DatabaseError(e.to_string())
    }
}

/// Persistent day → committed spend accounting.
///
/// Every mutating call must be a single atomic operation against the store. In particular, [`Self::reserve`] must not
/// be implemented as a read followed by a write, since concurrent checkouts race on the same day.
#[allow(async_fn_in_trait)]
pub trait SpendLedger: Clone {
    /// The committed spend for `day`, or zero if nothing has been committed yet.
    async fn fetch_committed(&self, day: NaiveDate) -> Result<MinorUnits, LedgerError>;

    async fn fetch_spend_record(&self, day: NaiveDate) -> Result<Option<SpendRecord>, LedgerError>;

    /// Adds `delta` to the committed spend for `day` if, and only if, the new total does not exceed `cap`.
    /// If the cap would be exceeded, nothing is written and `ok` is false.
    async fn reserve(&self, day: NaiveDate, delta: MinorUnits, cap: MinorUnits) -> Result<Reservation, LedgerError>;

    /// Gives back a reservation that was not used. The committed total never drops below zero.
    /// Returns the new total.
    async fn release(&self, day: NaiveDate, delta: MinorUnits) -> Result<MinorUnits, LedgerError>;

    /// Sets the committed spend for `day` to zero, creating the row if necessary.
    async fn reset(&self, day: NaiveDate) -> Result<(), LedgerError>;
}
