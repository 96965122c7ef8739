use serde::{Deserialize, Serialize};

use crate::{bm_api::order_objects::FulfillmentOrder, db_types::FulfillmentRecord};

/// Raised once the supplier has accepted the order for a paid session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentPlacedEvent {
    pub record: FulfillmentRecord,
    pub order: FulfillmentOrder,
}

impl FulfillmentPlacedEvent {
    pub fn new(record: FulfillmentRecord, order: FulfillmentOrder) -> Self {
        Self { record, order }
    }
}
