use std::fmt::Display;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// Body of `POST /admin/spend/limit`. The limit is in major units, e.g. `"150.00"` or `150`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendLimitParams {
    pub limit: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FulfillmentSearchParams {
    pub status: Option<String>,
}
