use std::fmt::Debug;

use badger_common::DEFAULT_CURRENCY_CODE;
use chrono::{NaiveDate, Utc};
use log::*;

use crate::{
    bm_api::{
        errors::CheckoutError,
        order_objects::{CheckoutResult, FulfillmentOrder, OrderRequest},
        spend_api::SpendLimit,
    },
    db_types::MinorUnits,
    traits::{CheckoutSessionRequest, PaymentProcessor, SpendLedger},
};

#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub currency: String,
    /// Where the processor sends the customer after paying. May contain the `{CHECKOUT_SESSION_ID}` placeholder.
    pub success_url: String,
    pub cancel_url: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY_CODE.to_string(),
            success_url: "http://localhost:8360/thanks?session_id={CHECKOUT_SESSION_ID}".to_string(),
            cancel_url: "http://localhost:8360/cancelled".to_string(),
        }
    }
}

/// `CheckoutApi` turns an [`OrderRequest`] into a hosted checkout session.
///
/// The order total is reserved against the daily cap *before* the session is created, and given back if the session
/// cannot be created. Money that the customer has not yet paid therefore counts against the cap, which is what keeps
/// concurrent checkouts from overshooting it.
pub struct CheckoutApi<B, P> {
    db: B,
    processor: P,
    limit: SpendLimit,
    config: CheckoutConfig,
}

impl<B, P> Debug for CheckoutApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi ({})", self.config.currency)
    }
}

impl<B, P> CheckoutApi<B, P> {
    pub fn new(db: B, processor: P, limit: SpendLimit, config: CheckoutConfig) -> Self {
        Self { db, processor, limit, config }
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }
}

impl<B, P> CheckoutApi<B, P>
where
    B: SpendLedger,
    P: PaymentProcessor,
{
    /// Creates a checkout session for the order, reserving its total against today's (UTC) budget.
    pub async fn create_checkout(&self, order: OrderRequest) -> Result<CheckoutResult, CheckoutError> {
        self.create_checkout_for_day(order, Utc::now().date_naive()).await
    }

    pub async fn create_checkout_for_day(
        &self,
        order: OrderRequest,
        day: NaiveDate,
    ) -> Result<CheckoutResult, CheckoutError> {
        order.validate().map_err(|e| {
            debug!("🛒️ Order rejected. {e}");
            CheckoutError::ValidationError(e)
        })?;
        let (unit_amount, amount) = order.amounts().map_err(CheckoutError::ValidationError)?;
        let limit = self.limit.get();
        let reservation = self.db.reserve(day, amount, limit).await?;
        if !reservation.ok {
            info!(
                "🛒️ Order for {} x {} ({amount}) refused. {} of {limit} already committed for {day}",
                order.quantity, order.variant_id, reservation.new_total
            );
            return Err(CheckoutError::CapExceeded { requested: amount, committed: reservation.new_total, limit });
        }
        trace!("🛒️ {amount} reserved for {day}. Committed is now {}", reservation.new_total);
        let request = self.session_request(&order, unit_amount, amount, day);
        match self.processor.create_checkout_session(&request).await {
            Ok(session) => {
                info!("🛒️ Checkout session {} created for {amount} {}", session.session_id, self.config.currency);
                Ok(CheckoutResult { checkout_url: session.url, session_id: session.session_id, amount })
            },
            Err(e) => {
                warn!("🛒️ Could not create checkout session. Releasing the {amount} reserved for {day}. {e}");
                self.release_reservation(day, amount).await;
                Err(CheckoutError::ProcessorError(e))
            },
        }
    }

    async fn release_reservation(&self, day: NaiveDate, amount: MinorUnits) {
        match self.db.release(day, amount).await {
            Ok(total) => debug!("🛒️ Reservation released. Committed for {day} is back to {total}"),
            Err(e) => error!(
                "🛒️ Could not release a reservation of {amount} for {day}. The committed spend for that day is now \
                 overstated by {amount} and must be corrected by hand. {e}"
            ),
        }
    }

    fn session_request(
        &self,
        order: &OrderRequest,
        unit_amount: MinorUnits,
        amount: MinorUnits,
        day: NaiveDate,
    ) -> CheckoutSessionRequest {
        let metadata = FulfillmentOrder::from_order_request(order, day).to_metadata();
        CheckoutSessionRequest {
            product_name: order.display_name(),
            description: order.description(),
            image_url: order.image_url.clone(),
            unit_amount,
            quantity: order.quantity,
            amount,
            currency: self.config.currency.clone(),
            metadata,
            success_url: self.config.success_url.clone(),
            cancel_url: self.config.cancel_url.clone(),
        }
    }
}
