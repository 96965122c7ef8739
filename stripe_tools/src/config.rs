use std::time::Duration;

use badger_common::{helpers::non_empty_env, Secret};
use log::*;

pub const DEFAULT_STRIPE_API_URL: &str = "https://api.stripe.com";
pub const DEFAULT_WEBHOOK_TOLERANCE_SECS: i64 = 300;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Base url of the Stripe REST API. Only overridden in tests.
    pub api_url: String,
    pub secret_key: Secret<String>,
    /// The `whsec_...` signing secret for the webhook endpoint.
    pub webhook_secret: Secret<String>,
    /// Maximum age (and clock skew) of a webhook signature timestamp, in seconds.
    pub webhook_tolerance: i64,
    pub timeout: Duration,
    /// Connected account that receives the payout split for each paid session, if any.
    pub transfer_destination: Option<String>,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_STRIPE_API_URL.to_string(),
            secret_key: Secret::default(),
            webhook_secret: Secret::default(),
            webhook_tolerance: DEFAULT_WEBHOOK_TOLERANCE_SECS,
            timeout: DEFAULT_TIMEOUT,
            transfer_destination: None,
        }
    }
}

impl StripeConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = non_empty_env("BM_STRIPE_API_URL").unwrap_or_else(|| DEFAULT_STRIPE_API_URL.to_string());
        let secret_key = Secret::new(non_empty_env("BM_STRIPE_SECRET_KEY").unwrap_or_else(|| {
            error!("🪛️ BM_STRIPE_SECRET_KEY is not set. Checkout sessions cannot be created without it.");
            String::default()
        }));
        let webhook_secret = Secret::new(non_empty_env("BM_STRIPE_WEBHOOK_SECRET").unwrap_or_else(|| {
            error!("🪛️ BM_STRIPE_WEBHOOK_SECRET is not set. Every webhook delivery will be rejected.");
            String::default()
        }));
        let webhook_tolerance = non_empty_env("BM_STRIPE_WEBHOOK_TOLERANCE")
            .and_then(|s| {
                s.parse::<i64>()
                    .map_err(|e| warn!("🪛️ Invalid value for BM_STRIPE_WEBHOOK_TOLERANCE ({s}). {e}"))
                    .ok()
            })
            .filter(|t| *t > 0)
            .unwrap_or(DEFAULT_WEBHOOK_TOLERANCE_SECS);
        let timeout = non_empty_env("BM_HTTP_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        let transfer_destination = non_empty_env("BM_STRIPE_TRANSFER_DESTINATION");
        match &transfer_destination {
            Some(acct) => info!("🪛️ Paid sessions will be transferred to connected account {acct}"),
            None => debug!("🪛️ No transfer destination configured. Payout splits are disabled."),
        }
        Self { api_url, secret_key, webhook_secret, webhook_tolerance, timeout, transfer_destination }
    }
}
