use badger_common::{MinorUnits, Secret};
use badger_engine::{
    db_types::SessionId,
    order_objects::PaidSession,
    traits::{
        CheckoutSessionRequest,
        NewSessionInfo,
        PaymentIntentInfo,
        PaymentProcessor,
        ProcessorError,
        TransferRequest,
    },
};
use log::*;
use stripe_tools::{
    webhook::construct_event,
    CheckoutSession,
    NewCheckoutSession,
    NewTransfer,
    StripeApi,
    StripeApiError,
    StripeConfig,
    WebhookError,
    WebhookEvent,
};

/// [`PaymentProcessor`] backed by the Stripe REST API.
#[derive(Clone)]
pub struct StripeGateway {
    api: StripeApi,
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let api = StripeApi::new(config)?;
        Ok(Self { api })
    }
}

fn processor_error(e: StripeApiError) -> ProcessorError {
    match e {
        StripeApiError::Timeout(s) => ProcessorError::Timeout(s),
        StripeApiError::RestRequestError(s) => ProcessorError::Unavailable(s),
        StripeApiError::QueryError { status, message } => {
            ProcessorError::Rejected(format!("Stripe returned {status}. {message}"))
        },
        StripeApiError::JsonError(s) | StripeApiError::IncompleteResponse(s) => ProcessorError::InvalidResponse(s),
        StripeApiError::Initialization(s) => ProcessorError::NotConfigured(s),
    }
}

impl PaymentProcessor for StripeGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<NewSessionInfo, ProcessorError> {
        if !self.api.config().secret_key.is_set() {
            return Err(ProcessorError::NotConfigured("No Stripe secret key has been set".into()));
        }
        let session = NewCheckoutSession {
            product_name: request.product_name.clone(),
            description: request.description.clone(),
            image_url: request.image_url.clone(),
            unit_amount: request.unit_amount.value(),
            quantity: request.quantity,
            currency: request.currency.clone(),
            metadata: request.metadata.clone(),
            success_url: request.success_url.clone(),
            cancel_url: request.cancel_url.clone(),
        };
        let result = self.api.create_checkout_session(&session).await.map_err(processor_error)?;
        if let Some(total) = result.amount_total.filter(|t| *t != request.amount.value()) {
            warn!(
                "💳️ Stripe reports a total of {total} for session {}, but {} was reserved",
                result.id, request.amount
            );
        }
        let url = result
            .url
            .ok_or_else(|| ProcessorError::InvalidResponse(format!("Checkout session {} has no url", result.id)))?;
        Ok(NewSessionInfo { session_id: SessionId::from(result.id), url })
    }

    async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntentInfo, ProcessorError> {
        let intent = self.api.retrieve_payment_intent(id).await.map_err(processor_error)?;
        Ok(PaymentIntentInfo {
            id: intent.id,
            amount_received: MinorUnits::from(intent.amount_received),
            currency: intent.currency,
        })
    }

    async fn create_transfer(&self, transfer: &TransferRequest) -> Result<String, ProcessorError> {
        let new_transfer = NewTransfer {
            amount: transfer.amount.value(),
            currency: transfer.currency.clone(),
            destination: transfer.destination.clone(),
            transfer_group: transfer.transfer_group.clone(),
        };
        let result =
            self.api.create_transfer(&new_transfer, &transfer.idempotency_key).await.map_err(processor_error)?;
        Ok(result.id)
    }
}

/// Authenticates webhook deliveries with the endpoint's signing secret.
#[derive(Debug, Clone)]
pub struct WebhookVerifier {
    secret: Secret<String>,
    tolerance_secs: i64,
}

impl WebhookVerifier {
    pub fn new(secret: Secret<String>, tolerance_secs: i64) -> Self {
        Self { secret, tolerance_secs }
    }

    pub fn from_config(config: &StripeConfig) -> Self {
        Self::new(config.webhook_secret.clone(), config.webhook_tolerance)
    }

    /// Checks the `Stripe-Signature` header against the raw body, then types the event.
    pub fn verify(&self, payload: &[u8], signature: &str) -> Result<WebhookEvent, WebhookError> {
        let event = construct_event(payload, signature, self.secret.reveal(), self.tolerance_secs)?;
        debug!("🪝️ Received {} event {}", event.event_type, event.id);
        WebhookEvent::try_from(event)
    }
}

/// Extracts what the fulfillment dispatcher needs from a completed checkout session.
pub fn paid_session_from_checkout(session: CheckoutSession) -> PaidSession {
    PaidSession {
        session_id: SessionId::from(session.id),
        payment_intent: session.payment_intent,
        amount_total: session.amount_total.map(MinorUnits::from),
        currency: session.currency,
        customer_email: session.customer_details.and_then(|c| c.email),
        metadata: session.metadata,
    }
}
