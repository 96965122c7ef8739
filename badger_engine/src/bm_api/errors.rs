use thiserror::Error;

use crate::{
    db_types::MinorUnits,
    traits::{LedgerError, ProcessorError, SupplierError},
};

#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("Invalid order. {0}")]
    ValidationError(String),
    #[error("The daily spend limit has been reached. {requested} requested, {committed} of {limit} already committed")]
    CapExceeded { requested: MinorUnits, committed: MinorUnits, limit: MinorUnits },
    #[error("Could not create a checkout session. {0}")]
    ProcessorError(#[from] ProcessorError),
    #[error("Could not update the spend ledger. {0}")]
    StorageError(#[from] LedgerError),
}

#[derive(Debug, Clone, Error)]
pub enum FulfillmentError {
    #[error("The supplier could not place the order. {0}")]
    SupplierError(#[from] SupplierError),
    #[error("The checkout session cannot be fulfilled. {0}")]
    MalformedSession(String),
    #[error("Could not update the fulfillment ledger. {0}")]
    StorageError(#[from] LedgerError),
}

#[derive(Debug, Clone, Error)]
pub enum SpendApiError {
    #[error("Invalid spend limit. {0}")]
    InvalidLimit(String),
    #[error("Could not access the spend ledger. {0}")]
    StorageError(#[from] LedgerError),
}
