//! # Stripe Configuration
//!
//! Configuration management for Stripe integration.
//! The API key is loaded from the environment and never logged.

use split_core::PaymentError;
use std::env;

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";
const DEFAULT_API_VERSION: &str = "2024-12-18.acacia";

/// API version the mobile PaymentSheet SDK expects for ephemeral keys
pub const EPHEMERAL_KEY_API_VERSION: &str = "2023-10-16";

/// Stripe's test Visa card token
pub const PLACEHOLDER_CARD_TOKEN: &str = "tok_visa";

/// Stripe API configuration
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret or restricted API key (sk_... / rk_...)
    pub secret_key: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// API version sent with every request
    pub api_version: String,

    /// API version ephemeral keys are pinned to
    pub ephemeral_key_api_version: String,

    /// Card token used for the placeholder payment method of new customers
    pub placeholder_card_token: String,
}

const KEY_PREFIXES: [&str; 4] = ["sk_test_", "sk_live_", "rk_test_", "rk_live_"];

impl StripeConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `STRIPE_API_KEY`
    ///
    /// Optional:
    /// - `STRIPE_API_BASE_URL`
    /// - `STRIPE_EPHEMERAL_KEY_API_VERSION`
    /// - `STRIPE_PLACEHOLDER_CARD_TOKEN`
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let secret_key = env::var("STRIPE_API_KEY")
            .map_err(|_| PaymentError::Configuration("STRIPE_API_KEY not set".to_string()))?;

        let mut config = Self::new(secret_key);
        config.validate()?;

        if let Ok(url) = env::var("STRIPE_API_BASE_URL") {
            config.api_base_url = url;
        }
        if let Ok(version) = env::var("STRIPE_EPHEMERAL_KEY_API_VERSION") {
            config.ephemeral_key_api_version = version;
        }
        if let Ok(token) = env::var("STRIPE_PLACEHOLDER_CARD_TOKEN") {
            config.placeholder_card_token = token;
        }

        Ok(config)
    }

    /// Create config with explicit values (for testing)
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            ephemeral_key_api_version: EPHEMERAL_KEY_API_VERSION.to_string(),
            placeholder_card_token: PLACEHOLDER_CARD_TOKEN.to_string(),
        }
    }

    /// Check the key format
    pub fn validate(&self) -> Result<(), PaymentError> {
        if !KEY_PREFIXES.iter().any(|p| self.secret_key.starts_with(p)) {
            return Err(PaymentError::Configuration(
                "STRIPE_API_KEY must start with sk_test_, sk_live_, rk_test_ or rk_live_"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.secret_key.starts_with("sk_test_") || self.secret_key.starts_with("rk_test_")
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.secret_key)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Builder: set the placeholder card token
    pub fn with_placeholder_card_token(mut self, token: impl Into<String>) -> Self {
        self.placeholder_card_token = token.into();
        self
    }
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"<redacted>")
            .field("test_mode", &self.is_test_mode())
            .field("api_base_url", &self.api_base_url)
            .field("api_version", &self.api_version)
            .field("ephemeral_key_api_version", &self.ephemeral_key_api_version)
            .field("placeholder_card_token", &self.placeholder_card_token)
            .finish()
    }
}
