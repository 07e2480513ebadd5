use std::fmt;
use std::path::PathBuf;

use checkout::checkout::{DEFAULT_CURRENCY, DEFAULT_PREFERRED_SHIPPING};
use checkout::CheckoutConfig;
use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_DIR: &str = ".storefront-checkout";

#[derive(Clone, Serialize, Deserialize, Default)]
pub struct Store {
    pub url: String,
    pub api_key: Option<String>,
    pub session_token: Option<String>,
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");

        f.debug_struct("Store")
            .field("url", &self.url)
            .field("api_key", &redact(&self.api_key))
            .field("session_token", &redact(&self.session_token))
            .field("timeout_secs", &self.timeout_secs)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSettings {
    pub preferred_shipping_description: Option<String>,
    pub currency_fallback: String,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            preferred_shipping_description: Some(DEFAULT_PREFERRED_SHIPPING.to_string()),
            currency_fallback: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl From<CheckoutSettings> for CheckoutConfig {
    fn from(settings: CheckoutSettings) -> Self {
        Self {
            preferred_shipping_description: settings
                .preferred_shipping_description
                .filter(|description| !description.is_empty()),
            default_currency: settings.currency_fallback,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub store: Store,
    #[serde(default)]
    pub checkout: CheckoutSettings,
}

impl Settings {
    pub fn new<P>(config_file_name: Option<P>) -> Self
    where
        P: Into<PathBuf>,
    {
        let default_settings = Self::default();
        // attempt to construct settings with file
        let from_file = Self::new_from_default(&default_settings, config_file_name);
        match from_file {
            Ok(f) => f,
            Err(e) => {
                tracing::error!(
                    "Error reading config file, falling back to defaults. Error: {e:?}"
                );
                default_settings
            }
        }
    }

    fn new_from_default<P>(
        default: &Settings,
        config_file_name: Option<P>,
    ) -> Result<Self, ConfigError>
    where
        P: Into<PathBuf>,
    {
        let config_file_name = match config_file_name {
            Some(value) => value.into(),
            None => home::home_dir()
                .ok_or(ConfigError::NotFound("Config Path".to_string()))?
                .join(DEFAULT_CONFIG_DIR)
                .join("config.toml"),
        };

        let config: String = config_file_name.to_string_lossy().to_string();
        let builder = Config::builder();
        let config: Config = builder
            // use defaults
            .add_source(Config::try_from(default)?)
            // override with file contents
            .add_source(File::with_name(&config).required(false))
            .build()?;

        config.try_deserialize()
    }
}
