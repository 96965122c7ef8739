//! # Badger merch server
//! This crate hosts the HTTP front end of the merch back end. It is responsible for:
//! * Accepting orders and handing back a Stripe hosted checkout url, subject to the daily spend limit.
//! * Receiving Stripe webhooks, verifying their signature and placing the Printful order for each paid session,
//!   exactly once.
//! * Letting an administrator inspect and adjust the daily spend limit, and list fulfillment outcomes.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/checkout`: Creates a checkout session for an order.
//! * `/webhook`: The Stripe webhook endpoint.
//! * `/admin/spend`, `/admin/spend/reset`, `/admin/spend/limit`, `/admin/fulfillments`: Administration. These need the
//!   admin token.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
