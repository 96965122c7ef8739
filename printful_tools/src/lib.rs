//! # Printful tools
//!
//! Places print-on-demand orders with the Printful REST API. Only order creation is supported; Printful takes it
//! from there (printing, packing, shipping).
mod api;
mod config;
mod error;

pub mod data_objects;

pub use api::PrintfulApi;
pub use config::PrintfulConfig;
pub use data_objects::{NewOrder, OrderFile, OrderItem, PrintfulOrder, Recipient};
pub use error::PrintfulApiError;
