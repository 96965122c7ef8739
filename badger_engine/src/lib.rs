//! Badger Engine
//!
//! The engine holds the core of the merch back end: the order → payment → fulfillment pipeline. It is
//! provider-agnostic; the payment processor and print-on-demand supplier are reached through the traits in
//! [`mod@traits`], and implemented by the server.
//!
//! The library is divided into these main sections:
//! 1. Storage ([`mod@sqlite`]). SQLite holds the only durable state: the committed spend per day, and the fulfillment
//!    outcome per checkout session. You should never need to access the database directly. Instead, use the public
//!    API provided by the engine. The exception is the data types used in the database. These are defined in the
//!    `db_types` module and are public.
//! 2. The engine public API ([`mod@bm_api`]). [`CheckoutApi`] reserves spend against the daily cap and creates
//!    checkout sessions. [`FulfillmentApi`] places the supplier order for each paid session, at most once.
//!    [`SpendApi`] reports on and adjusts the cap.
//!
//! The engine also publishes events (see [`mod@events`]) that subscribers can hook into, e.g. to send the customer a
//! confirmation once their order has been placed.
pub mod bm_api;
pub mod db_types;
pub mod events;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use bm_api::{
    checkout_api::{CheckoutApi, CheckoutConfig},
    errors::{CheckoutError, FulfillmentError, SpendApiError},
    fulfillment_api::FulfillmentApi,
    order_objects,
    spend_api::{SpendApi, SpendLimit, SpendStatus},
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
