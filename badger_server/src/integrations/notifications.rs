//! Order confirmations.
//!
//! Once the supplier has accepted an order, the engine raises a [`FulfillmentPlacedEvent`]. The hook registered here
//! sends the customer a plain-text confirmation through an HTTP mail relay. Delivery is best-effort: a failure is
//! logged and the fulfillment stands.
use std::sync::Arc;

use badger_engine::{
    events::{EventHandlers, EventHooks, FulfillmentPlacedEvent},
    order_objects::DEFAULT_PRODUCT_NAME,
    traits::{Notifier, NotifierError},
};
use futures::future::BoxFuture;
use log::*;
use reqwest::Client;
use serde::Serialize;

use crate::config::MailRelayConfig;

pub const NOTIFICATION_EVENT_BUFFER_SIZE: usize = 25;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Posts `{to, subject, body}` as JSON to the relay, with the relay token as a bearer token if one is set.
#[derive(Clone)]
pub struct MailRelayNotifier {
    config: MailRelayConfig,
    client: Arc<Client>,
}

impl MailRelayNotifier {
    pub fn new(config: MailRelayConfig) -> Result<Self, NotifierError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotifierError::DeliveryFailed(format!("Could not create mail relay client. {e}")))?;
        Ok(Self { config, client: Arc::new(client) })
    }
}

impl Notifier for MailRelayNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifierError> {
        let message = MailMessage { to: to.to_string(), subject: subject.to_string(), body: body.to_string() };
        let mut req = self.client.post(&self.config.url).json(&message);
        if self.config.token.is_set() {
            req = req.bearer_auth(self.config.token.reveal());
        }
        let response = req.send().await.map_err(|e| NotifierError::DeliveryFailed(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            debug!("✉️ Mail relay accepted message to {to}");
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(NotifierError::DeliveryFailed(format!("Mail relay returned {status}. {text}")))
        }
    }
}

/// Builds the confirmation sent to the customer once their order is with the supplier.
pub fn confirmation_message(event: &FulfillmentPlacedEvent) -> MailMessage {
    let order = &event.order;
    let product = order.product_name.as_deref().unwrap_or(DEFAULT_PRODUCT_NAME);
    let size = order.size.as_ref().map(|s| format!("size {s}"));
    let colour = order.color.as_ref().map(|c| format!("colour {c}"));
    let options = [size, colour].into_iter().flatten().collect::<Vec<_>>();
    let item = if options.is_empty() {
        format!("{} x {product}", order.quantity)
    } else {
        format!("{} x {product} ({})", order.quantity, options.join(", "))
    };
    let reference = event.record.supplier_order_id.as_deref().unwrap_or("pending");
    let body = format!(
        "Hi {},\n\nThanks for your order! We've sent it to be printed:\n\n  {item}\n\nIt will be shipped to:\n\n  {}\n  \
         {}\n\nYour order reference is {} (supplier order {reference}).\n\nThe Badger Merch team\n",
        order.recipient.name, order.recipient.address, order.recipient.city, event.record.session_id
    );
    MailMessage { to: order.recipient.email.clone(), subject: format!("Your {product} order is on its way"), body }
}

/// Registers the confirmation hook. Returns handlers with no subscribers if no relay is configured.
pub fn create_notification_event_handlers(config: Option<MailRelayConfig>) -> Result<EventHandlers, NotifierError> {
    let mut hooks = EventHooks::default();
    if let Some(config) = config {
        let notifier = MailRelayNotifier::new(config)?;
        hooks.on_fulfillment_placed(move |ev| {
            let notifier = notifier.clone();
            let message = confirmation_message(&ev);
            let fut: BoxFuture<'static, ()> = Box::pin(async move {
                match notifier.send(&message.to, &message.subject, &message.body).await {
                    Ok(()) => info!("✉️ Order confirmation for session {} sent", ev.record.session_id),
                    Err(e) => warn!("✉️ Could not send the confirmation for session {}. {e}", ev.record.session_id),
                }
            });
            fut
        });
    }
    Ok(EventHandlers::new(NOTIFICATION_EVENT_BUFFER_SIZE, hooks))
}
