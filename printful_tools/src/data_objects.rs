use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    pub email: String,
    pub address1: String,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    pub country_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFile {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub variant_id: i64,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<OrderFile>,
}

/// The body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    /// Our own reference for the order. Printful rejects a second order with the same external id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub recipient: Recipient,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrintfulOrder {
    pub id: i64,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Printful wraps every response as `{"code": 200, "result": ...}`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Envelope<T> {
    #[allow(dead_code)]
    pub code: i64,
    pub result: T,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorEnvelope {
    pub fn message(self) -> Option<String> {
        self.error.and_then(|e| e.message).or(self.result)
    }
}
