//! API Config

use std::time::Duration;

use clap::Args;
use rusty_money::iso::Currency;

use crate::prices::{PriceError, currency_from_code};

/// Backend API settings.
#[derive(Debug, Clone, Args)]
pub struct ApiConfig {
    /// Base URL of the storefront backend
    #[arg(long, env = "STOREFRONT_API_URL", default_value = "http://localhost:4000/api")]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "STOREFRONT_API_TIMEOUT_SECONDS", default_value_t = 10_u64)]
    pub api_timeout_seconds: u64,

    /// Delay before redirecting to login after the session expires, in milliseconds
    #[arg(long, env = "STOREFRONT_REDIRECT_DELAY_MS", default_value_t = 1_500_u64)]
    pub redirect_delay_ms: u64,

    /// ISO currency code of catalog prices
    #[arg(long, env = "STOREFRONT_CURRENCY", default_value = "NPR")]
    pub currency: String,
}

impl ApiConfig {
    /// Settings for `api_url` with every other value at its default.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_timeout_seconds: 10,
            redirect_delay_ms: 1_500,
            currency: "NPR".to_string(),
        }
    }

    /// Override the redirect delay.
    #[must_use]
    pub fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_seconds)
    }

    /// Delay before the expiry redirect.
    #[must_use]
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    /// Currency of catalog prices.
    ///
    /// # Errors
    ///
    /// Returns an error for an unsupported currency code.
    pub fn currency(&self) -> Result<&'static Currency, PriceError> {
        currency_from_code(&self.currency)
    }
}
