use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{EventHandler, EventProducer, FulfillmentPlacedEvent, Handler};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub fulfillment_placed_producer: Vec<EventProducer<FulfillmentPlacedEvent>>,
}

pub struct EventHandlers {
    pub on_fulfillment_placed: Option<EventHandler<FulfillmentPlacedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_fulfillment_placed = hooks.on_fulfillment_placed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_fulfillment_placed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_fulfillment_placed {
            result.fulfillment_placed_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_fulfillment_placed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_fulfillment_placed: Option<Handler<FulfillmentPlacedEvent>>,
}

impl EventHooks {
    pub fn on_fulfillment_placed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(FulfillmentPlacedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_fulfillment_placed = Some(Arc::new(f));
        self
    }
}
