//! Fire-and-forget notifications of engine state changes.
//!
//! Subscribers register async closures through [`EventHooks`]. The engine publishes into [`EventProducers`] and
//! never waits for (or learns the outcome of) the handlers, so a slow or failing subscriber cannot hold up or roll
//! back the flow that raised the event.
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
