use std::{
    fmt::Debug,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};

use chrono::{NaiveDate, Utc};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{bm_api::errors::SpendApiError, db_types::MinorUnits, traits::SpendLedger};

/// The daily cap, shared by every worker. Changes take effect on the next reservation.
#[derive(Debug, Clone, Default)]
pub struct SpendLimit(Arc<AtomicI64>);

impl SpendLimit {
    pub fn new(limit: MinorUnits) -> Self {
        Self(Arc::new(AtomicI64::new(limit.value())))
    }

    pub fn get(&self) -> MinorUnits {
        MinorUnits::from(self.0.load(Ordering::SeqCst))
    }

    /// Replaces the limit, returning the previous value.
    pub fn set(&self, limit: MinorUnits) -> MinorUnits {
        MinorUnits::from(self.0.swap(limit.value(), Ordering::SeqCst))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendStatus {
    pub day: NaiveDate,
    pub committed: MinorUnits,
    pub limit: MinorUnits,
    /// Zero when the limit has been lowered below what is already committed.
    pub remaining: MinorUnits,
}

/// Administrative access to the daily spend ledger.
pub struct SpendApi<B> {
    db: B,
    limit: SpendLimit,
}

impl<B> Debug for SpendApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SpendApi (limit {})", self.limit.get())
    }
}

impl<B> SpendApi<B> {
    pub fn new(db: B, limit: SpendLimit) -> Self {
        Self { db, limit }
    }

    pub fn limit(&self) -> MinorUnits {
        self.limit.get()
    }

    pub fn set_limit(&self, limit: MinorUnits) -> Result<MinorUnits, SpendApiError> {
        if limit < MinorUnits::ZERO {
            return Err(SpendApiError::InvalidLimit(format!("{limit} is negative")));
        }
        let previous = self.limit.set(limit);
        info!("🔐️ Daily spend limit changed from {previous} to {limit}");
        Ok(previous)
    }
}

impl<B> SpendApi<B>
where B: SpendLedger
{
    pub async fn status(&self) -> Result<SpendStatus, SpendApiError> {
        self.status_for_day(Utc::now().date_naive()).await
    }

    pub async fn status_for_day(&self, day: NaiveDate) -> Result<SpendStatus, SpendApiError> {
        let committed = self.db.fetch_committed(day).await?;
        let limit = self.limit.get();
        let remaining = if committed < limit { limit - committed } else { MinorUnits::ZERO };
        Ok(SpendStatus { day, committed, limit, remaining })
    }

    pub async fn reset(&self) -> Result<SpendStatus, SpendApiError> {
        self.reset_day(Utc::now().date_naive()).await
    }

    pub async fn reset_day(&self, day: NaiveDate) -> Result<SpendStatus, SpendApiError> {
        let before = self.db.fetch_committed(day).await?;
        self.db.reset(day).await?;
        warn!("🔐️ Committed spend for {day} was reset by an administrator. It was {before}");
        self.status_for_day(day).await
    }
}
