use std::{env, time::Duration};

use badger_common::{helpers::non_empty_env, MinorUnits, Secret, DEFAULT_CURRENCY_CODE};
use badger_engine::CheckoutConfig;
use log::*;
use printful_tools::PrintfulConfig;
use rust_decimal::Decimal;
use stripe_tools::StripeConfig;

const DEFAULT_BM_HOST: &str = "127.0.0.1";
const DEFAULT_BM_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/badger_store.db";
const DEFAULT_DAILY_SPEND_LIMIT: i64 = 100;
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The daily spend cap at start-up. It can be changed at runtime through the admin routes.
    pub daily_spend_limit: MinorUnits,
    pub checkout: CheckoutConfig,
    /// Shared secret for the `/admin` routes. If it is not set, every admin request is refused.
    pub admin_token: Secret<String>,
    pub stripe: StripeConfig,
    pub printful: PrintfulConfig,
    pub mail_relay: Option<MailRelayConfig>,
}

#[derive(Clone, Debug)]
pub struct MailRelayConfig {
    pub url: String,
    pub token: Secret<String>,
    pub timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_BM_HOST.into(),
            port: DEFAULT_BM_PORT,
            database_url: DEFAULT_DATABASE_URL.into(),
            daily_spend_limit: MinorUnits::from(DEFAULT_DAILY_SPEND_LIMIT * 100),
            checkout: CheckoutConfig::default(),
            admin_token: Secret::default(),
            stripe: StripeConfig::default(),
            printful: PrintfulConfig::default(),
            mail_relay: None,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.into(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("BM_HOST").ok().unwrap_or_else(|| DEFAULT_BM_HOST.into());
        let port = env::var("BM_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for BM_PORT. {e} Using the default, {DEFAULT_BM_PORT}, instead."
                    );
                    DEFAULT_BM_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_BM_PORT);
        let database_url = non_empty_env("BM_DATABASE_URL").unwrap_or_else(|| {
            info!("🪛️ BM_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.into()
        });
        let daily_spend_limit = configure_spend_limit(non_empty_env("BM_DAILY_SPEND_LIMIT"));
        let checkout = configure_checkout();
        let admin_token = Secret::new(non_empty_env("BM_ADMIN_TOKEN").unwrap_or_else(|| {
            warn!("🪛️ BM_ADMIN_TOKEN is not set. All requests to the /admin routes will be refused.");
            String::default()
        }));
        let stripe = StripeConfig::new_from_env_or_default();
        let printful = PrintfulConfig::new_from_env_or_default();
        let mail_relay = configure_mail_relay();
        Self { host, port, database_url, daily_spend_limit, checkout, admin_token, stripe, printful, mail_relay }
    }
}

/// Parses the daily limit, given in major units (e.g. "150" or "99.50"). Anything that isn't a non-negative amount
/// falls back to the default.
fn configure_spend_limit(value: Option<String>) -> MinorUnits {
    let default = MinorUnits::from(DEFAULT_DAILY_SPEND_LIMIT * 100);
    let Some(s) = value else {
        info!("🪛️ BM_DAILY_SPEND_LIMIT is not set. The daily spend limit is {default}");
        return default;
    };
    let limit = s
        .trim()
        .parse::<Decimal>()
        .map_err(|e| e.to_string())
        .and_then(|d| MinorUnits::from_major(d).map_err(|e| e.to_string()));
    match limit {
        Ok(limit) => {
            info!("🪛️ The daily spend limit is {limit}");
            limit
        },
        Err(e) => {
            error!("🪛️ {s} is not a valid value for BM_DAILY_SPEND_LIMIT. {e} Using the default, {default}, instead.");
            default
        },
    }
}

fn configure_checkout() -> CheckoutConfig {
    let defaults = CheckoutConfig::default();
    let currency = non_empty_env("BM_CURRENCY").map(|c| c.to_lowercase()).unwrap_or_else(|| {
        info!("🪛️ BM_CURRENCY is not set. Using {DEFAULT_CURRENCY_CODE}");
        defaults.currency.clone()
    });
    let success_url = non_empty_env("BM_SUCCESS_URL").unwrap_or_else(|| {
        warn!("🪛️ BM_SUCCESS_URL is not set. Customers will be sent to {} after paying", defaults.success_url);
        defaults.success_url.clone()
    });
    let cancel_url = non_empty_env("BM_CANCEL_URL").unwrap_or_else(|| {
        warn!("🪛️ BM_CANCEL_URL is not set. Using {}", defaults.cancel_url);
        defaults.cancel_url.clone()
    });
    CheckoutConfig { currency, success_url, cancel_url }
}

fn configure_mail_relay() -> Option<MailRelayConfig> {
    let Some(url) = non_empty_env("BM_MAIL_RELAY_URL") else {
        info!("🪛️ BM_MAIL_RELAY_URL is not set. Order confirmations will not be sent.");
        return None;
    };
    let token = Secret::new(non_empty_env("BM_MAIL_RELAY_TOKEN").unwrap_or_default());
    let timeout = non_empty_env("BM_HTTP_TIMEOUT_SECS")
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_HTTP_TIMEOUT);
    info!("🪛️ Order confirmations will be sent through {url}");
    Some(MailRelayConfig { url, token, timeout })
}
