//! # Stripe tools
//!
//! A thin client for the handful of Stripe endpoints the merch back end needs (hosted checkout sessions, payment
//! intents and connected-account transfers), plus verification of the `Stripe-Signature` header that accompanies
//! every webhook delivery.
//!
//! Requests are form-encoded, as the Stripe REST API expects, and every call is bounded by the timeout configured in
//! [`StripeConfig`].
mod api;
mod config;
mod error;

pub mod data_objects;
pub mod webhook;

pub use api::StripeApi;
pub use config::StripeConfig;
pub use data_objects::{CheckoutSession, NewCheckoutSession, NewTransfer, PaymentIntent, StripeEvent, Transfer};
pub use error::StripeApiError;
pub use webhook::{WebhookError, WebhookEvent};
