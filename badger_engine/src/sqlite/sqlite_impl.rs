//! `SqliteDatabase` is the concrete storage backend for the Badger engine.
//!
//! It implements both [`SpendLedger`] and [`FulfillmentLedger`] on top of a single connection pool.
use std::fmt::Debug;

use chrono::NaiveDate;
use log::*;
use sqlx::SqlitePool;

use super::db::{db_url, fulfillments, new_pool, run_migrations, spend};
use crate::{
    db_types::{FulfillmentRecord, FulfillmentStatus, FulfillmentUpdate, MinorUnits, Reservation, SessionId, SpendRecord},
    traits::{FulfillmentLedger, LedgerError, SpendLedger},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SpendLedger for SqliteDatabase {
    async fn fetch_committed(&self, day: NaiveDate) -> Result<MinorUnits, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let committed = spend::fetch_committed(day, &mut conn).await?;
        Ok(committed)
    }

    async fn fetch_spend_record(&self, day: NaiveDate) -> Result<Option<SpendRecord>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let record = spend::fetch_spend_record(day, &mut conn).await?;
        Ok(record)
    }

    async fn reserve(&self, day: NaiveDate, delta: MinorUnits, cap: MinorUnits) -> Result<Reservation, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let reservation = match spend::try_reserve(day, delta, cap, &mut conn).await? {
            Some(new_total) => {
                debug!("🗃️ Reserved {delta} for {day}. Committed is now {new_total}");
                Reservation { new_total, ok: true }
            },
            None => {
                let current = spend::fetch_committed(day, &mut conn).await?;
                debug!("🗃️ Reservation of {delta} for {day} refused. Committed is {current} of {cap}");
                Reservation { new_total: current, ok: false }
            },
        };
        Ok(reservation)
    }

    async fn release(&self, day: NaiveDate, delta: MinorUnits) -> Result<MinorUnits, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let total = spend::release(day, delta, &mut conn).await?;
        debug!("🗃️ Released {delta} for {day}. Committed is now {total}");
        Ok(total)
    }

    async fn reset(&self, day: NaiveDate) -> Result<(), LedgerError> {
        let mut conn = self.pool.acquire().await?;
        spend::reset(day, &mut conn).await?;
        info!("🗃️ Committed spend for {day} has been reset to zero");
        Ok(())
    }
}

impl FulfillmentLedger for SqliteDatabase {
    async fn claim(&self, session_id: &SessionId) -> Result<bool, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let acquired = fulfillments::claim(session_id, &mut conn).await?;
        trace!("🗃️ Claim on session {session_id}: {acquired}");
        Ok(acquired)
    }

    async fn update(
        &self,
        session_id: &SessionId,
        update: FulfillmentUpdate,
    ) -> Result<Option<FulfillmentRecord>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let status = update.status();
        let record = fulfillments::update(session_id, update, &mut conn).await?;
        match &record {
            Some(_) => debug!("🗃️ Fulfillment for session {session_id} is now {status}"),
            None => debug!("🗃️ Fulfillment for session {session_id} is not pending. Update to {status} ignored"),
        }
        Ok(record)
    }

    async fn fetch(&self, session_id: &SessionId) -> Result<Option<FulfillmentRecord>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let record = fulfillments::fetch(session_id, &mut conn).await?;
        Ok(record)
    }

    async fn search(&self, status: Option<FulfillmentStatus>) -> Result<Vec<FulfillmentRecord>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        let records = fulfillments::search(status, &mut conn).await?;
        Ok(records)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using `BM_DATABASE_URL` or the default url.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date. Safe to call on every start.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        run_migrations(&self.pool).await
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&mut self) -> Result<(), sqlx::Error> {
        self.pool.close().await;
        Ok(())
    }
}
