use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client,
};

use crate::{
    config::PrintfulConfig,
    data_objects::{Envelope, ErrorEnvelope},
    NewOrder,
    PrintfulApiError,
    PrintfulOrder,
};

#[derive(Clone)]
pub struct PrintfulApi {
    config: PrintfulConfig,
    client: Arc<Client>,
}

impl PrintfulApi {
    pub fn new(config: PrintfulConfig) -> Result<Self, PrintfulApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        let bearer = format!("Bearer {}", config.api_key.reveal());
        let mut val = HeaderValue::from_str(&bearer).map_err(|e| PrintfulApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert(AUTHORIZATION, val);
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| PrintfulApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &PrintfulConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url.trim_end_matches('/'))
    }

    /// Submits an order for fulfillment. Printful confirms the order immediately (`confirm=true`), so a successful
    /// response means the order is in the print queue.
    pub async fn create_order(&self, order: &NewOrder) -> Result<PrintfulOrder, PrintfulApiError> {
        let url = self.url("/orders");
        debug!("🖨️ Placing order with {} line item(s) for {}", order.items.len(), order.recipient.email);
        let response = self.client.post(url).query(&[("confirm", "true")]).json(order).send().await?;
        let status = response.status();
        if status.is_success() {
            let envelope = response
                .json::<Envelope<PrintfulOrder>>()
                .await
                .map_err(|e| PrintfulApiError::JsonError(e.to_string()))?;
            info!("🖨️ Printful accepted order {}", envelope.result.id);
            Ok(envelope.result)
        } else {
            let body = response.text().await?;
            let message =
                serde_json::from_str::<ErrorEnvelope>(&body).ok().and_then(ErrorEnvelope::message).unwrap_or(body);
            warn!("🖨️ Printful rejected the order. {status}. {message}");
            Err(PrintfulApiError::QueryError { status: status.as_u16(), message })
        }
    }
}
