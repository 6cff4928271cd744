//! # split-stripe
//!
//! Stripe implementation of the split-pay `PaymentProcessor`.
//!
//! `StripeClient` talks to the Stripe REST API directly with `reqwest`:
//! form-encoded requests, JSON responses, one HTTP call per operation.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use split_stripe::{StripeClient, StripeConfig};
//! use split_core::{PaymentIntentIssuer, BoxedPaymentProcessor};
//! use std::sync::Arc;
//!
//! // STRIPE_API_KEY must be set (or present in .env)
//! let client: BoxedPaymentProcessor = Arc::new(StripeClient::from_env()?);
//!
//! let issuer = PaymentIntentIssuer::new(client);
//! ```

pub mod client;
pub mod config;

// Re-exports
pub use client::StripeClient;
pub use config::StripeConfig;
