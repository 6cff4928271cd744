//! # split-core
//!
//! Core types and handlers for the split-pay payment proxy.
//!
//! This crate provides:
//! - `PaymentProcessor` trait, the seam to the payment processor's API
//! - `CustomerProvisioner` for creating customers with a best-effort default card
//! - `PaymentIntentIssuer` for marketplace payment intents with a platform fee
//! - `Outcome` for results that can degrade instead of failing
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use split_core::{CustomerProvisioner, CreateCustomerRequest};
//!
//! let provisioner = CustomerProvisioner::new(processor.clone(), "tok_visa");
//!
//! let outcome = provisioner
//!     .provision(None, CreateCustomerRequest::new("ada@example.com", "Ada"))
//!     .await?;
//!
//! // Payment method attachment may have degraded, the customer exists either way
//! let result = outcome.into_value();
//! ```

pub mod customer;
pub mod error;
pub mod fee;
pub mod intent;
pub mod models;
pub mod outcome;
pub mod processor;

#[cfg(any(test, feature = "test-util"))]
pub mod in_memory;

// Re-exports for convenience
pub use customer::{CreateCustomerRequest, CreateCustomerResult, CustomerProvisioner};
pub use error::{ErrorKind, PaymentError, PaymentResult};
pub use fee::{application_fee, MAX_AMOUNT, PLATFORM_FEE_PERCENT};
pub use intent::{
    CreatePaymentIntentRequest, CreatePaymentIntentResult, CustomerRef, PaymentIntentCommand,
    PaymentIntentIssuer, DEFAULT_CURRENCY,
};
pub use models::{
    CallerIdentity, Customer, EphemeralKey, NewCustomer, PaymentIntent, PaymentIntentParams,
    PaymentMethod,
};
pub use outcome::Outcome;
pub use processor::{BoxedPaymentProcessor, PaymentProcessor};

#[cfg(any(test, feature = "test-util"))]
pub use in_memory::{InMemoryProcessor, Operation};
