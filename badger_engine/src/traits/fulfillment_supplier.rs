use thiserror::Error;

use crate::db_types::SessionId;

#[derive(Debug, Clone, Error)]
pub enum SupplierError {
    #[error("The supplier did not respond in time. {0}")]
    Timeout(String),
    #[error("Could not reach the supplier. {0}")]
    Unavailable(String),
    #[error("The supplier rejected the order. {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplierRecipient {
    pub name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub postcode: Option<String>,
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplierItem {
    pub variant_id: String,
    pub quantity: i64,
    /// Overrides the print file stored against the variant.
    pub file_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplierOrder {
    /// Our reference for the order, passed to the supplier as its external id.
    pub external_id: SessionId,
    pub recipient: SupplierRecipient,
    pub items: Vec<SupplierItem>,
}

#[allow(async_fn_in_trait)]
pub trait FulfillmentSupplier: Clone {
    /// Places the order and returns the supplier's order id.
    async fn create_order(&self, order: &SupplierOrder) -> Result<String, SupplierError>;
}
