use std::{fmt::Display, str::FromStr};

pub use badger_common::MinorUnits;
use chrono::{DateTime, NaiveDate, Utc};
use log::*;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------       SessionId       ---------------------------------------------------------
/// The opaque checkout session identifier assigned by the payment processor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl FromStr for SessionId {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------      SpendRecord      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct SpendRecord {
    pub spend_date: NaiveDate,
    pub committed: MinorUnits,
    pub updated_at: DateTime<Utc>,
}

/// The result of an attempt to add to the day's committed spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reservation {
    /// The committed total after the attempt. When `ok` is false, this is the unchanged total.
    pub new_total: MinorUnits,
    pub ok: bool,
}

//--------------------------------------   FulfillmentStatus   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum FulfillmentStatus {
    /// The session has been claimed and the supplier call is in flight (or the process died mid-call).
    Pending,
    /// The supplier accepted the order.
    Placed,
    /// The supplier rejected the order, timed out, or the session could not be turned into an order.
    Failed,
}

impl Display for FulfillmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FulfillmentStatus::Pending => write!(f, "Pending"),
            FulfillmentStatus::Placed => write!(f, "Placed"),
            FulfillmentStatus::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid fulfillment status: {0}")]
pub struct ConversionError(String);

impl FromStr for FulfillmentStatus {
    type Err = ConversionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "placed" => Ok(Self::Placed),
            "failed" => Ok(Self::Failed),
            _ => Err(ConversionError(s.to_string())),
        }
    }
}

impl From<String> for FulfillmentStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("🗃️ Invalid fulfillment status: {value}. But this conversion cannot fail. Defaulting to Pending");
            FulfillmentStatus::Pending
        })
    }
}

//--------------------------------------   FulfillmentRecord   ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct FulfillmentRecord {
    pub session_id: SessionId,
    pub status: FulfillmentStatus,
    pub supplier_order_id: Option<String>,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The terminal state a pending fulfillment moves into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FulfillmentUpdate {
    Placed { supplier_order_id: String },
    Failed { detail: String },
}

impl FulfillmentUpdate {
    pub fn status(&self) -> FulfillmentStatus {
        match self {
            FulfillmentUpdate::Placed { .. } => FulfillmentStatus::Placed,
            FulfillmentUpdate::Failed { .. } => FulfillmentStatus::Failed,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_parsing() {
        assert_eq!("Placed".parse::<FulfillmentStatus>().unwrap(), FulfillmentStatus::Placed);
        assert_eq!("failed".parse::<FulfillmentStatus>().unwrap(), FulfillmentStatus::Failed);
        assert!("shipped".parse::<FulfillmentStatus>().is_err());
        assert_eq!(FulfillmentStatus::from("nonsense".to_string()), FulfillmentStatus::Pending);
        assert_eq!(FulfillmentStatus::Pending.to_string(), "Pending");
    }
}
