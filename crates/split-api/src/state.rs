//! # Application State
//!
//! Shared state for the Axum application.
//! Holds the two handlers, each wired to the payment processor, and the
//! caller verifier.

use crate::auth::{CallerVerifier, JwtCallerVerifier};
use split_core::{BoxedPaymentProcessor, CustomerProvisioner, PaymentIntentIssuer};
use split_stripe::StripeClient;
use std::sync::Arc;
use tracing::warn;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Log output format
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_format: std::env::var("LOG_FORMAT")
                .map(|f| LogFormat::parse(&f))
                .unwrap_or(LogFormat::Pretty),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Build the caller verifier from `CALLER_JWT_SECRET` and the optional
/// `CALLER_JWT_ISSUER` / `CALLER_JWT_AUDIENCE`
fn verifier_from_env() -> anyhow::Result<JwtCallerVerifier> {
    let secret = std::env::var("CALLER_JWT_SECRET")
        .map_err(|_| anyhow::anyhow!("CALLER_JWT_SECRET not set"))?;

    let mut verifier = JwtCallerVerifier::new(secret.as_bytes());
    if let Ok(issuer) = std::env::var("CALLER_JWT_ISSUER") {
        verifier = verifier.with_issuer(&issuer);
    }
    if let Ok(audience) = std::env::var("CALLER_JWT_AUDIENCE") {
        verifier = verifier.with_audience(&audience);
    }
    Ok(verifier)
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// `createCustomer` handler
    pub provisioner: CustomerProvisioner,
    /// `createPaymentIntent` handler
    pub issuer: PaymentIntentIssuer,
    /// Caller ID token verifier
    pub verifier: Arc<dyn CallerVerifier>,
    /// Processor name, for logs
    pub provider: &'static str,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create state backed by Stripe, configured from the environment
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let stripe = StripeClient::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;
        if config.is_production() && stripe.config().is_test_mode() {
            warn!("Running in production with a Stripe test key");
        }
        let card_token = stripe.config().placeholder_card_token.clone();

        let verifier = verifier_from_env()?;

        Ok(Self::with_processor(
            config,
            Arc::new(stripe),
            card_token,
            Arc::new(verifier),
        ))
    }

    /// Create state around any processor and verifier
    pub fn with_processor(
        config: AppConfig,
        processor: BoxedPaymentProcessor,
        card_token: impl Into<String>,
        verifier: Arc<dyn CallerVerifier>,
    ) -> Self {
        Self {
            provisioner: CustomerProvisioner::new(processor.clone(), card_token),
            issuer: PaymentIntentIssuer::new(processor.clone()),
            verifier,
            provider: processor.provider_name(),
            config,
        }
    }
}
