//! # Payment Processor Trait
//!
//! The one seam between the handlers and the payment processor's API.
//! `split-stripe` provides the HTTP implementation; tests use
//! `InMemoryProcessor`.
//!
//! ```text
//! ┌──────────────────────┐   ┌──────────────────────┐
//! │ CustomerProvisioner  │   │ PaymentIntentIssuer  │
//! └──────────┬───────────┘   └──────────┬───────────┘
//!            └────────────┬─────────────┘
//!                         ▼
//!        ┌─────────────────────────────────┐
//!        │   PaymentProcessor (trait)      │
//!        └─────────────────────────────────┘
//!                ▲                  ▲
//!        ┌───────┴──────┐   ┌───────┴────────┐
//!        │ StripeClient │   │InMemoryProcessor│
//!        └──────────────┘   └────────────────┘
//! ```

use crate::error::PaymentResult;
use crate::models::{
    Customer, EphemeralKey, NewCustomer, PaymentIntent, PaymentIntentParams, PaymentMethod,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Client interface to the payment processor.
///
/// Every method is a single upstream call; none of them retry.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Create a customer record.
    async fn create_customer(&self, customer: &NewCustomer) -> PaymentResult<Customer>;

    /// Look up a customer by exact email.
    ///
    /// The query is capped at one result, so with duplicate emails on the
    /// account the processor's first match wins.
    async fn find_customer_by_email(&self, email: &str) -> PaymentResult<Option<Customer>>;

    /// Create a card payment method from a card token (e.g. `tok_visa`).
    async fn create_card_payment_method(&self, token: &str) -> PaymentResult<PaymentMethod>;

    /// Attach a payment method to a customer.
    async fn attach_payment_method(
        &self,
        payment_method_id: &str,
        customer_id: &str,
    ) -> PaymentResult<PaymentMethod>;

    /// Make a payment method the customer's default for invoices.
    async fn set_default_payment_method(
        &self,
        customer_id: &str,
        payment_method_id: &str,
    ) -> PaymentResult<Customer>;

    /// Create an ephemeral key scoped to a customer, pinned to the API
    /// version the mobile SDK expects.
    async fn create_ephemeral_key(&self, customer_id: &str) -> PaymentResult<EphemeralKey>;

    /// Create a payment intent with a destination transfer and application fee.
    async fn create_payment_intent(
        &self,
        params: &PaymentIntentParams,
    ) -> PaymentResult<PaymentIntent>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared payment processor (dynamic dispatch)
pub type BoxedPaymentProcessor = Arc<dyn PaymentProcessor>;
