use std::collections::HashMap;

use badger_common::MinorUnitsConversionError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{FulfillmentRecord, MinorUnits, SessionId},
    traits::{SupplierItem, SupplierOrder, SupplierRecipient},
};

pub const DEFAULT_PRODUCT_NAME: &str = "Badger Merch";

//--------------------------------------      Metadata keys    ---------------------------------------------------------
// Checkout metadata is the only channel that carries order details through to the webhook, so these keys are a wire
// format. Do not rename them while sessions may still be open.
pub mod keys {
    pub const VARIANT_ID: &str = "variant_id";
    pub const PRODUCT_ID: &str = "product_id";
    pub const PRODUCT_NAME: &str = "product_name";
    pub const QUANTITY: &str = "quantity";
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const ADDRESS: &str = "address";
    pub const CITY: &str = "city";
    pub const POSTCODE: &str = "postcode";
    pub const COUNTRY_CODE: &str = "country_code";
    pub const SIZE: &str = "size";
    pub const COLOR: &str = "color";
    pub const IMAGE_URL: &str = "image_url";
    pub const SPEND_DATE: &str = "spend_date";
}

//--------------------------------------        Recipient       --------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

impl Recipient {
    fn missing_fields(&self) -> Vec<&'static str> {
        [(keys::NAME, &self.name), (keys::EMAIL, &self.email), (keys::ADDRESS, &self.address), (keys::CITY, &self.city)]
            .into_iter()
            .filter(|(_, v)| v.trim().is_empty())
            .map(|(k, _)| k)
            .collect()
    }
}

impl From<Recipient> for SupplierRecipient {
    fn from(r: Recipient) -> Self {
        Self {
            name: r.name,
            email: r.email,
            address: r.address,
            city: r.city,
            postcode: r.postcode,
            country_code: r.country_code,
        }
    }
}

//--------------------------------------      OrderRequest      --------------------------------------------------------
/// A customer's order, as submitted to `POST /checkout`. It is never stored; its details travel to the webhook inside
/// the checkout session metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// The supplier's identifier for the product variant (size/colour combination) being ordered.
    pub variant_id: String,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    pub quantity: i64,
    /// Price of a single item, in major units of the checkout currency.
    pub unit_price: Decimal,
    pub recipient: Recipient,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl OrderRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.quantity < 1 {
            return Err(format!("Quantity must be at least 1, but was {}", self.quantity));
        }
        if self.unit_price.is_sign_negative() && !self.unit_price.is_zero() {
            return Err(format!("Unit price cannot be negative ({})", self.unit_price));
        }
        if self.variant_id.trim().is_empty() {
            return Err("A variant id is required".to_string());
        }
        let missing = self.recipient.missing_fields();
        if !missing.is_empty() {
            return Err(format!("Missing recipient field(s): {}", missing.join(", ")));
        }
        Ok(())
    }

    /// Returns the unit price and the total, in minor units.
    ///
    /// The unit price is rounded (half away from zero) exactly once, before it is multiplied by the quantity. This
    /// keeps the per-item price on the checkout page consistent with the total: 3 × 12.995 is 3 × 13.00 = 39.00.
    pub fn amounts(&self) -> Result<(MinorUnits, MinorUnits), String> {
        let unit = MinorUnits::from_major(self.unit_price).map_err(|e| match e {
            MinorUnitsConversionError::Negative(_) => format!("Unit price cannot be negative. {e}"),
            MinorUnitsConversionError::Overflow(_) => format!("Unit price is too large. {e}"),
        })?;
        let total = unit
            .checked_mul(self.quantity)
            .ok_or_else(|| format!("Order total overflows ({} x {})", unit, self.quantity))?;
        Ok((unit, total))
    }

    pub fn display_name(&self) -> String {
        self.product_name.as_deref().filter(|s| !s.trim().is_empty()).unwrap_or(DEFAULT_PRODUCT_NAME).to_string()
    }

    /// A one-line summary shown on the hosted checkout page, e.g. "Size: M, Colour: Black".
    pub fn description(&self) -> Option<String> {
        let parts = [("Size", &self.size), ("Colour", &self.color)]
            .into_iter()
            .filter_map(|(label, v)| v.as_deref().filter(|s| !s.is_empty()).map(|v| format!("{label}: {v}")))
            .collect::<Vec<_>>();
        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

//--------------------------------------     CheckoutResult     --------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResult {
    pub checkout_url: String,
    pub session_id: SessionId,
    pub amount: MinorUnits,
}

//--------------------------------------    FulfillmentOrder    --------------------------------------------------------
/// Everything needed to place the supplier order for a paid session, recovered from the session metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentOrder {
    pub variant_id: String,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub quantity: i64,
    pub recipient: Recipient,
    pub size: Option<String>,
    pub color: Option<String>,
    pub image_url: Option<String>,
    /// The day the spend was reserved against.
    pub spend_date: Option<NaiveDate>,
}

impl FulfillmentOrder {
    pub fn from_order_request(order: &OrderRequest, spend_date: NaiveDate) -> Self {
        Self {
            variant_id: order.variant_id.trim().to_string(),
            product_id: order.product_id.clone(),
            product_name: order.product_name.clone(),
            quantity: order.quantity,
            recipient: order.recipient.clone(),
            size: order.size.clone(),
            color: order.color.clone(),
            image_url: order.image_url.clone(),
            spend_date: Some(spend_date),
        }
    }

    /// Flattens the order into string metadata. Absent optional fields are left out rather than sent as blanks.
    pub fn to_metadata(&self) -> HashMap<String, String> {
        let mut meta = HashMap::new();
        let mut put = |k: &str, v: Option<String>| {
            if let Some(v) = v.filter(|v| !v.is_empty()) {
                meta.insert(k.to_string(), v);
            }
        };
        put(keys::VARIANT_ID, Some(self.variant_id.clone()));
        put(keys::PRODUCT_ID, self.product_id.clone());
        put(keys::PRODUCT_NAME, self.product_name.clone());
        put(keys::QUANTITY, Some(self.quantity.to_string()));
        put(keys::NAME, Some(self.recipient.name.clone()));
        put(keys::EMAIL, Some(self.recipient.email.clone()));
        put(keys::ADDRESS, Some(self.recipient.address.clone()));
        put(keys::CITY, Some(self.recipient.city.clone()));
        put(keys::POSTCODE, self.recipient.postcode.clone());
        put(keys::COUNTRY_CODE, self.recipient.country_code.clone());
        put(keys::SIZE, self.size.clone());
        put(keys::COLOR, self.color.clone());
        put(keys::IMAGE_URL, self.image_url.clone());
        put(keys::SPEND_DATE, self.spend_date.map(|d| d.to_string()));
        meta
    }

    pub fn from_metadata(meta: &HashMap<String, String>) -> Result<Self, String> {
        let get = |k: &str| meta.get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |k: &str| get(k).ok_or_else(|| format!("Session metadata is missing '{k}'"));
        let quantity = required(keys::QUANTITY)?
            .parse::<i64>()
            .map_err(|e| format!("Session metadata has an invalid quantity. {e}"))?;
        if quantity < 1 {
            return Err(format!("Session metadata has an invalid quantity ({quantity})"));
        }
        let spend_date = get(keys::SPEND_DATE)
            .map(|d| d.parse::<NaiveDate>().map_err(|e| format!("Session metadata has an invalid spend date. {e}")))
            .transpose()?;
        let recipient = Recipient {
            name: required(keys::NAME)?,
            email: required(keys::EMAIL)?,
            address: required(keys::ADDRESS)?,
            city: required(keys::CITY)?,
            postcode: get(keys::POSTCODE),
            country_code: get(keys::COUNTRY_CODE),
        };
        Ok(Self {
            variant_id: required(keys::VARIANT_ID)?,
            product_id: get(keys::PRODUCT_ID),
            product_name: get(keys::PRODUCT_NAME),
            quantity,
            recipient,
            size: get(keys::SIZE),
            color: get(keys::COLOR),
            image_url: get(keys::IMAGE_URL),
            spend_date,
        })
    }

    pub fn to_supplier_order(&self, session_id: &SessionId) -> SupplierOrder {
        SupplierOrder {
            external_id: session_id.clone(),
            recipient: self.recipient.clone().into(),
            items: vec![SupplierItem {
                variant_id: self.variant_id.clone(),
                quantity: self.quantity,
                file_url: self.image_url.clone(),
            }],
        }
    }
}

//--------------------------------------       PaidSession      --------------------------------------------------------
/// A checkout session that the payment processor has reported as completed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaidSession {
    pub session_id: SessionId,
    pub payment_intent: Option<String>,
    pub amount_total: Option<MinorUnits>,
    pub currency: Option<String>,
    pub customer_email: Option<String>,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FulfillmentOutcome {
    /// This delivery claimed the session and the supplier accepted the order.
    Placed(FulfillmentRecord),
    /// The session was claimed by an earlier delivery. The record may be in any state, including `Pending` if that
    /// delivery is still in flight.
    AlreadyRecorded(FulfillmentRecord),
}

impl FulfillmentOutcome {
    pub fn record(&self) -> &FulfillmentRecord {
        match self {
            FulfillmentOutcome::Placed(r) | FulfillmentOutcome::AlreadyRecorded(r) => r,
        }
    }
}
