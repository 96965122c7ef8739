use std::time::Duration;

use badger_common::{helpers::non_empty_env, Secret};
use log::*;

pub const DEFAULT_PRINTFUL_API_URL: &str = "https://api.printful.com";
pub const DEFAULT_COUNTRY_CODE: &str = "GB";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct PrintfulConfig {
    pub api_url: String,
    pub api_key: Secret<String>,
    /// Used when an order's recipient does not name a country.
    pub default_country: String,
    pub timeout: Duration,
}

impl Default for PrintfulConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_PRINTFUL_API_URL.to_string(),
            api_key: Secret::default(),
            default_country: DEFAULT_COUNTRY_CODE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl PrintfulConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = non_empty_env("BM_PRINTFUL_API_URL").unwrap_or_else(|| DEFAULT_PRINTFUL_API_URL.to_string());
        let api_key = Secret::new(non_empty_env("BM_PRINTFUL_API_KEY").unwrap_or_else(|| {
            error!("🪛️ BM_PRINTFUL_API_KEY is not set. Fulfillment orders will be rejected by Printful.");
            String::default()
        }));
        let default_country = non_empty_env("BM_PRINTFUL_DEFAULT_COUNTRY")
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| DEFAULT_COUNTRY_CODE.to_string());
        let timeout = non_empty_env("BM_HTTP_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        Self { api_url, api_key, default_country, timeout }
    }
}
