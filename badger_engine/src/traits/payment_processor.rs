use std::collections::HashMap;

use thiserror::Error;

use crate::db_types::{MinorUnits, SessionId};

#[derive(Debug, Clone, Error)]
pub enum ProcessorError {
    #[error("The payment processor did not respond in time. {0}")]
    Timeout(String),
    #[error("Could not reach the payment processor. {0}")]
    Unavailable(String),
    #[error("The payment processor rejected the request. {0}")]
    Rejected(String),
    #[error("The payment processor returned an unusable response. {0}")]
    InvalidResponse(String),
    #[error("The payment processor is not configured. {0}")]
    NotConfigured(String),
}

/// A single line-item, one-off payment session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSessionRequest {
    pub product_name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub unit_amount: MinorUnits,
    pub quantity: i64,
    /// The total the customer will be charged. Always `unit_amount * quantity`.
    pub amount: MinorUnits,
    pub currency: String,
    pub metadata: HashMap<String, String>,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSessionInfo {
    pub session_id: SessionId,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentInfo {
    pub id: String,
    pub amount_received: MinorUnits,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub amount: MinorUnits,
    pub currency: String,
    pub destination: String,
    pub transfer_group: Option<String>,
    /// Replays with the same key must not move money twice.
    pub idempotency_key: String,
}

#[allow(async_fn_in_trait)]
pub trait PaymentProcessor: Clone {
    async fn create_checkout_session(&self, request: &CheckoutSessionRequest)
        -> Result<NewSessionInfo, ProcessorError>;

    async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntentInfo, ProcessorError>;

    /// Returns the processor's id for the new transfer.
    async fn create_transfer(&self, transfer: &TransferRequest) -> Result<String, ProcessorError>;
}
