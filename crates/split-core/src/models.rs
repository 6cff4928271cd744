//! # Processor Entities
//!
//! The processor is the system of record for every entity here; these types
//! only carry identifiers and the fields the handlers read back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated caller, as established by the invocation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    /// Stable user id (token subject)
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl CallerIdentity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
        }
    }
}

/// A customer record held by the processor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Processor id (cus_...)
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Fields for a new customer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewCustomer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl NewCustomer {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            name: Some(name.into()),
        }
    }

    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            name: None,
        }
    }
}

/// A tokenized payment method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Processor id (pm_...)
    pub id: String,
    /// Customer the method is attached to, once attached
    #[serde(default)]
    pub customer: Option<String>,
}

/// Short-lived, customer-scoped client credential
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EphemeralKey {
    pub id: String,
    pub secret: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

// Keeps the secret out of logs
impl std::fmt::Debug for EphemeralKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EphemeralKey")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// A created payment intent
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Processor id (pi_...)
    pub id: String,
    /// Secret the client uses to confirm the intent
    pub client_secret: String,
    pub amount: i64,
    #[serde(default)]
    pub application_fee_amount: Option<i64>,
}

impl std::fmt::Debug for PaymentIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentIntent")
            .field("id", &self.id)
            .field("client_secret", &"<redacted>")
            .field("amount", &self.amount)
            .field("application_fee_amount", &self.application_fee_amount)
            .finish()
    }
}

/// Parameters for a destination charge with an application fee
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentParams {
    /// Amount in minor currency units
    pub amount: i64,
    /// Lowercase ISO 4217 code
    pub currency: String,
    pub customer_id: String,
    /// Connected account receiving the transfer (acct_...)
    pub destination: String,
    /// Amount withheld by the platform
    pub application_fee_amount: i64,
}
