use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client,
    Method,
};
use serde::de::DeserializeOwned;

use crate::{
    config::StripeConfig,
    data_objects::{ErrorEnvelope, NewCheckoutSession, NewTransfer},
    CheckoutSession,
    PaymentIntent,
    StripeApiError,
    Transfer,
};

#[derive(Clone)]
pub struct StripeApi {
    config: StripeConfig,
    client: Arc<Client>,
}

impl StripeApi {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        let bearer = format!("Bearer {}", config.secret_key.reveal());
        let mut val = HeaderValue::from_str(&bearer).map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert(AUTHORIZATION, val);
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/v1{path}", self.config.api_url.trim_end_matches('/'))
    }

    /// Sends a form-encoded request to the Stripe API.
    ///
    /// If an `idempotency_key` is given, Stripe guarantees that replays of the same key return the original result
    /// rather than performing the action again.
    pub async fn rest_query<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: &[(String, String)],
        idempotency_key: Option<&str>,
    ) -> Result<T, StripeApiError> {
        let url = self.url(path);
        trace!("💳️ Sending REST query: {method} {url}");
        let mut req = self.client.request(method.clone(), url);
        if !form.is_empty() {
            req = if method == Method::GET { req.query(form) } else { req.form(form) };
        }
        if let Some(key) = idempotency_key {
            req = req.header("Idempotency-Key", key);
        }
        let response = req.send().await?;
        let status = response.status();
        if status.is_success() {
            trace!("💳️ REST query successful. {status}");
            response.json::<T>().await.map_err(|e| StripeApiError::JsonError(e.to_string()))
        } else {
            let body = response.text().await?;
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|env| {
                    let kind = env.error.error_type.unwrap_or_default();
                    env.error.message.map(|m| if kind.is_empty() { m } else { format!("[{kind}] {m}") })
                })
                .unwrap_or(body);
            Err(StripeApiError::QueryError { status: status.as_u16(), message })
        }
    }

    /// Creates a hosted checkout session and returns it. The session is guaranteed to carry a redirect url.
    pub async fn create_checkout_session(
        &self,
        session: &NewCheckoutSession,
    ) -> Result<CheckoutSession, StripeApiError> {
        debug!(
            "💳️ Creating checkout session for {} x {} ({} {} each)",
            session.quantity, session.product_name, session.unit_amount, session.currency
        );
        let result =
            self.rest_query::<CheckoutSession>(Method::POST, "/checkout/sessions", &session.to_form(), None).await?;
        if result.url.is_none() {
            return Err(StripeApiError::IncompleteResponse(format!("Checkout session {} has no url", result.id)));
        }
        info!("💳️ Created checkout session {}", result.id);
        Ok(result)
    }

    pub async fn retrieve_checkout_session(&self, id: &str) -> Result<CheckoutSession, StripeApiError> {
        let path = format!("/checkout/sessions/{id}");
        self.rest_query::<CheckoutSession>(Method::GET, &path, &[], None).await
    }

    pub async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, StripeApiError> {
        let path = format!("/payment_intents/{id}");
        debug!("💳️ Fetching payment intent {id}");
        self.rest_query::<PaymentIntent>(Method::GET, &path, &[], None).await
    }

    /// Moves funds to a connected account. The idempotency key should be derived from whatever the transfer pays
    /// out for (e.g. the checkout session id), so that a replay can never pay out twice.
    pub async fn create_transfer(
        &self,
        transfer: &NewTransfer,
        idempotency_key: &str,
    ) -> Result<Transfer, StripeApiError> {
        debug!("💳️ Transferring {} {} to {}", transfer.amount, transfer.currency, transfer.destination);
        let result =
            self.rest_query::<Transfer>(Method::POST, "/transfers", &transfer.to_form(), Some(idempotency_key)).await?;
        info!("💳️ Transfer {} created", result.id);
        Ok(result)
    }
}
