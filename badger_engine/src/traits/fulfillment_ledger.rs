use crate::{
    db_types::{FulfillmentRecord, FulfillmentStatus, FulfillmentUpdate, SessionId},
    traits::LedgerError,
};

/// session id → fulfillment outcome.
///
/// The ledger is the only thing standing between a redelivered webhook and a second supplier order, so both
/// [`Self::claim`] and [`Self::update`] must be single atomic statements.
#[allow(async_fn_in_trait)]
pub trait FulfillmentLedger: Clone {
    /// Creates a `Pending` record for the session. Returns `true` if this call created the record, and `false` if a
    /// record (in any state) already existed.
    async fn claim(&self, session_id: &SessionId) -> Result<bool, LedgerError>;

    /// Moves a `Pending` record into its terminal state. Records that are already `Placed` or `Failed` are left
    /// untouched and `None` is returned.
    async fn update(
        &self,
        session_id: &SessionId,
        update: FulfillmentUpdate,
    ) -> Result<Option<FulfillmentRecord>, LedgerError>;

    async fn fetch(&self, session_id: &SessionId) -> Result<Option<FulfillmentRecord>, LedgerError>;

    /// Lists fulfillment records, most recent first, optionally restricted to a single status.
    async fn search(&self, status: Option<FulfillmentStatus>) -> Result<Vec<FulfillmentRecord>, LedgerError>;
}
