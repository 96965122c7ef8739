use std::fmt::Debug;

use log::*;

use crate::{
    bm_api::{
        errors::FulfillmentError,
        order_objects::{FulfillmentOrder, FulfillmentOutcome, PaidSession},
    },
    db_types::{FulfillmentRecord, FulfillmentStatus, FulfillmentUpdate, SessionId},
    events::{EventProducers, FulfillmentPlacedEvent},
    traits::{FulfillmentLedger, FulfillmentSupplier, LedgerError, PaymentProcessor, TransferRequest},
};

/// `FulfillmentApi` reacts to completed checkout sessions by placing the supplier order, exactly once per session.
///
/// A session is *claimed* in the fulfillment ledger before anything else happens. Only the delivery that wins the claim
/// talks to the supplier; every other delivery of the same session (processor retries, replays, concurrent
/// deliveries) just reports the recorded outcome. A failed supplier call is recorded as `Failed` and is never retried
/// automatically.
pub struct FulfillmentApi<B, P, S> {
    db: B,
    processor: P,
    supplier: S,
    producers: EventProducers,
    transfer_destination: Option<String>,
}

impl<B, P, S> Debug for FulfillmentApi<B, P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FulfillmentApi")
    }
}

impl<B, P, S> FulfillmentApi<B, P, S> {
    pub fn new(db: B, processor: P, supplier: S, producers: EventProducers) -> Self {
        Self { db, processor, supplier, producers, transfer_destination: None }
    }

    /// Pays out each fulfilled session to a connected account.
    pub fn with_transfer_destination(mut self, destination: Option<String>) -> Self {
        self.transfer_destination = destination;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B, P, S> FulfillmentApi<B, P, S>
where
    B: FulfillmentLedger,
    P: PaymentProcessor,
    S: FulfillmentSupplier,
{
    pub async fn handle_completed_session(&self, session: PaidSession) -> Result<FulfillmentOutcome, FulfillmentError> {
        let session_id = &session.session_id;
        if session_id.as_str().is_empty() {
            return Err(FulfillmentError::MalformedSession("The session has no id".to_string()));
        }
        if !self.db.claim(session_id).await? {
            let record = self.fetch_existing(session_id).await?;
            info!(
                "📦️ Session {session_id} was already claimed ({}). Nothing to do for this delivery",
                record.status
            );
            return Ok(FulfillmentOutcome::AlreadyRecorded(record));
        }
        debug!("📦️ Session {session_id} claimed for fulfillment");
        let order = match FulfillmentOrder::from_metadata(&session.metadata) {
            Ok(order) => order,
            Err(detail) => {
                error!("📦️ Session {session_id} was paid for but cannot be fulfilled. {detail}");
                self.record(session_id, FulfillmentUpdate::Failed { detail: detail.clone() }).await?;
                return Err(FulfillmentError::MalformedSession(detail));
            },
        };
        let supplier_order = order.to_supplier_order(session_id);
        let result = match self.supplier.create_order(&supplier_order).await {
            Ok(supplier_order_id) => {
                info!("📦️ Supplier order {supplier_order_id} placed for session {session_id}");
                let update = FulfillmentUpdate::Placed { supplier_order_id };
                let record = self.record(session_id, update).await?;
                self.call_fulfillment_placed_hook(&record, &order).await;
                Ok(FulfillmentOutcome::Placed(record))
            },
            Err(e) => {
                error!("📦️ Supplier order for session {session_id} failed. It will not be retried. {e}");
                self.record(session_id, FulfillmentUpdate::Failed { detail: e.to_string() }).await?;
                Err(FulfillmentError::SupplierError(e))
            },
        };
        // Paid out whatever the supplier outcome, once it is on record.
        if let Some(destination) = &self.transfer_destination {
            self.pay_out(&session, destination).await;
        }
        result
    }

    pub async fn fetch_fulfillment(&self, session_id: &SessionId) -> Result<Option<FulfillmentRecord>, LedgerError> {
        self.db.fetch(session_id).await
    }

    pub async fn search_fulfillments(
        &self,
        status: Option<FulfillmentStatus>,
    ) -> Result<Vec<FulfillmentRecord>, LedgerError> {
        self.db.search(status).await
    }

    async fn fetch_existing(&self, session_id: &SessionId) -> Result<FulfillmentRecord, LedgerError> {
        self.db
            .fetch(session_id)
            .await?
            .ok_or_else(|| LedgerError::RecordMissing(format!("Session {session_id} is claimed but has no record")))
    }

    /// Writes the terminal state. We hold the claim, so the record can only be `Pending` here; if the update is
    /// nevertheless ignored, the current record is returned instead.
    async fn record(&self, session_id: &SessionId, update: FulfillmentUpdate) -> Result<FulfillmentRecord, LedgerError> {
        match self.db.update(session_id, update).await? {
            Some(record) => Ok(record),
            None => {
                warn!("📦️ Fulfillment record for {session_id} left the Pending state while it was claimed");
                self.fetch_existing(session_id).await
            },
        }
    }

    /// Transfers what the customer paid to the connected account. Failures are logged and otherwise ignored; the
    /// idempotency key makes a manual retry safe.
    async fn pay_out(&self, session: &PaidSession, destination: &str) {
        let session_id = &session.session_id;
        let Some(intent_id) = session.payment_intent.as_deref() else {
            warn!("💳️ Session {session_id} has no payment intent. Skipping the payout");
            return;
        };
        let intent = match self.processor.retrieve_payment_intent(intent_id).await {
            Ok(intent) => intent,
            Err(e) => {
                warn!("💳️ Could not fetch payment intent {intent_id} for session {session_id}. Skipping payout. {e}");
                return;
            },
        };
        let transfer = TransferRequest {
            amount: intent.amount_received,
            currency: intent.currency,
            destination: destination.to_string(),
            transfer_group: Some(session_id.to_string()),
            idempotency_key: format!("transfer-{session_id}"),
        };
        match self.processor.create_transfer(&transfer).await {
            Ok(id) => info!("💳️ Transfer {id} of {} sent to {destination} for session {session_id}", transfer.amount),
            Err(e) => error!(
                "💳️ Transfer of {} to {destination} for session {session_id} failed. Retry it by hand with \
                 idempotency key {}. {e}",
                transfer.amount, transfer.idempotency_key
            ),
        }
    }

    async fn call_fulfillment_placed_hook(&self, record: &FulfillmentRecord, order: &FulfillmentOrder) {
        for emitter in &self.producers.fulfillment_placed_producer {
            debug!("📬️ Notifying fulfillment placed hook subscribers");
            let event = FulfillmentPlacedEvent::new(record.clone(), order.clone());
            emitter.publish_event(event).await;
        }
    }
}
