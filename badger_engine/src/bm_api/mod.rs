//! # Badger engine public API
//!
//! * [`checkout_api`] turns an order into a hosted checkout session, reserving the spend against the daily cap first.
//! * [`fulfillment_api`] places the supplier order for a paid session, at most once per session.
//! * [`spend_api`] reports on and administers the daily cap.
//!
//! # API usage
//!
//! The pattern for using all the APIs is the same. An API instance is created by supplying the backends it needs:
//!
//! ```rust,ignore
//! use badger_engine::{CheckoutApi, SqliteDatabase, SpendLimit};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = CheckoutApi::new(db, stripe, SpendLimit::new(cap), config);
//! let result = api.create_checkout(order).await?;
//! ```
pub mod checkout_api;
pub mod errors;
pub mod fulfillment_api;
pub mod order_objects;
pub mod spend_api;
