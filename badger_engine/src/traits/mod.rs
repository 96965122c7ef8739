//! # Engine backends and collaborators
//!
//! The engine never talks to a database, payment processor or supplier directly. Instead it is generic over the traits
//! in this module.
//!
//! * [`SpendLedger`] persists the committed spend per calendar day and enforces the daily cap atomically.
//! * [`FulfillmentLedger`] records the fulfillment outcome for each paid checkout session, at most once.
//! * [`PaymentProcessor`] creates hosted checkout sessions and moves money (Stripe, in production).
//! * [`FulfillmentSupplier`] places print-on-demand orders (Printful, in production).
//! * [`Notifier`] delivers plain-text messages to customers.
//!
//! [`SqliteDatabase`](crate::SqliteDatabase) implements both ledgers. The processor, supplier and notifier are
//! implemented by the server, which owns the HTTP clients.
mod fulfillment_ledger;
mod fulfillment_supplier;
mod notifier;
mod payment_processor;
mod spend_ledger;

pub use fulfillment_ledger::FulfillmentLedger;
pub use fulfillment_supplier::{FulfillmentSupplier, SupplierError, SupplierItem, SupplierOrder, SupplierRecipient};
pub use notifier::{Notifier, NotifierError};
pub use payment_processor::{
    CheckoutSessionRequest,
    NewSessionInfo,
    PaymentIntentInfo,
    PaymentProcessor,
    ProcessorError,
    TransferRequest,
};
pub use spend_ledger::{LedgerError, SpendLedger};
