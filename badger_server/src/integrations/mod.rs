//! Adapters between the engine's collaborator traits and the concrete provider clients.
//!
//! * [`stripe::StripeGateway`] implements [`PaymentProcessor`](badger_engine::traits::PaymentProcessor).
//! * [`printful::PrintfulSupplier`] implements [`FulfillmentSupplier`](badger_engine::traits::FulfillmentSupplier).
//! * [`notifications`] delivers order confirmations through a mail relay, driven by engine events.
pub mod notifications;
pub mod printful;
pub mod stripe;
