//! Environment overrides for [`Settings`]

use std::env;

use crate::config::Settings;

pub const ENV_STORE_URL: &str = "CHECKOUT_STORE_URL";
pub const ENV_API_KEY: &str = "CHECKOUT_API_KEY";
pub const ENV_SESSION_TOKEN: &str = "CHECKOUT_SESSION_TOKEN";
pub const ENV_PREFERRED_SHIPPING: &str = "CHECKOUT_PREFERRED_SHIPPING";
pub const ENV_CURRENCY_FALLBACK: &str = "CHECKOUT_CURRENCY_FALLBACK";
pub const ENV_TIMEOUT_SECS: &str = "CHECKOUT_TIMEOUT_SECS";

impl Settings {
    pub fn from_env(mut self) -> Self {
        if let Ok(url) = env::var(ENV_STORE_URL) {
            self.store.url = url;
        }

        if let Ok(api_key) = env::var(ENV_API_KEY) {
            self.store.api_key = Some(api_key);
        }

        if let Ok(session_token) = env::var(ENV_SESSION_TOKEN) {
            self.store.session_token = Some(session_token);
        }

        if let Ok(timeout_str) = env::var(ENV_TIMEOUT_SECS) {
            if let Ok(timeout) = timeout_str.parse() {
                self.store.timeout_secs = Some(timeout);
            }
        }

        if let Ok(description) = env::var(ENV_PREFERRED_SHIPPING) {
            self.checkout.preferred_shipping_description = Some(description);
        }

        if let Ok(currency) = env::var(ENV_CURRENCY_FALLBACK) {
            self.checkout.currency_fallback = currency;
        }

        self
    }
}
