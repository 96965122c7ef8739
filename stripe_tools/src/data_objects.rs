use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

//--------------------------------------   Checkout sessions   ---------------------------------------------------------
/// The parameters for a one-off, single line item, hosted checkout session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCheckoutSession {
    pub product_name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Price of a single item, in minor units.
    pub unit_amount: i64,
    pub quantity: i64,
    pub currency: String,
    pub metadata: HashMap<String, String>,
    pub success_url: String,
    pub cancel_url: String,
}

impl NewCheckoutSession {
    /// Flattens the session into Stripe's bracketed form-encoding.
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("success_url".to_string(), self.success_url.clone()),
            ("cancel_url".to_string(), self.cancel_url.clone()),
            ("line_items[0][quantity]".to_string(), self.quantity.to_string()),
            ("line_items[0][price_data][currency]".to_string(), self.currency.clone()),
            ("line_items[0][price_data][unit_amount]".to_string(), self.unit_amount.to_string()),
            ("line_items[0][price_data][product_data][name]".to_string(), self.product_name.clone()),
        ];
        if let Some(description) = self.description.as_ref().filter(|d| !d.is_empty()) {
            form.push(("line_items[0][price_data][product_data][description]".to_string(), description.clone()));
        }
        if let Some(image) = self.image_url.as_ref().filter(|d| !d.is_empty()) {
            form.push(("line_items[0][price_data][product_data][images][0]".to_string(), image.clone()));
        }
        let mut keys = self.metadata.keys().collect::<Vec<_>>();
        keys.sort();
        for key in keys {
            form.push((format!("metadata[{key}]"), self.metadata[key].clone()));
        }
        form
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub email: Option<String>,
    pub name: Option<String>,
}

/// The subset of the Stripe `checkout.session` object that the back end reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
}

//--------------------------------------   Payment intents     ---------------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub amount_received: i64,
    pub currency: String,
    #[serde(default)]
    pub status: String,
}

//--------------------------------------       Transfers       ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransfer {
    pub amount: i64,
    pub currency: String,
    pub destination: String,
    pub transfer_group: Option<String>,
}

impl NewTransfer {
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = vec![
            ("amount".to_string(), self.amount.to_string()),
            ("currency".to_string(), self.currency.clone()),
            ("destination".to_string(), self.destination.clone()),
        ];
        if let Some(group) = &self.transfer_group {
            form.push(("transfer_group".to_string(), group.clone()));
        }
        form
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transfer {
    pub id: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub transfer_group: Option<String>,
}

//--------------------------------------        Events         ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventData {
    pub object: Value,
}

/// A raw Stripe event, as delivered to the webhook endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub livemode: bool,
    pub data: EventData,
}

/// Stripe's error envelope, `{"error": {"message": ..., "type": ...}}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}
