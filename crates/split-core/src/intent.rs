//! # Payment Intent Issuing
//!
//! Marketplace payment intents for the mobile client: resolve the paying
//! customer, hand the client an ephemeral key for it, and create a payment
//! intent whose funds go to the owner's connected account minus the
//! platform fee.
//!
//! Unlike customer provisioning there is no degraded path here. Once the
//! customer is resolved, any failure aborts the call.

use crate::error::{PaymentError, PaymentResult};
use crate::fee::{application_fee, MAX_AMOUNT};
use crate::models::{CallerIdentity, NewCustomer, PaymentIntentParams};
use crate::processor::BoxedPaymentProcessor;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

/// Currency used when the request names none
pub const DEFAULT_CURRENCY: &str = "usd";

/// `createPaymentIntent` payload as sent by the client.
///
/// Empty strings are treated the same as missing fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentRequest {
    /// Amount in minor currency units
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    /// Connected account that receives the transfer
    #[serde(default)]
    pub owner_stripe_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
}

/// How the paying customer is identified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerRef {
    /// Used as-is, without an existence check
    ById(String),
    /// Looked up by exact email, created if missing
    ByEmail(String),
}

/// A validated `createPaymentIntent` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentCommand {
    pub amount: i64,
    pub currency: String,
    pub destination: String,
    pub customer: CustomerRef,
    /// Platform share of `amount`
    pub application_fee_amount: i64,
}

// Blank counts as missing; a present value is passed on unchanged
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl CreatePaymentIntentRequest {
    /// Validate the payload. Runs before any processor call.
    pub fn validate(self) -> PaymentResult<PaymentIntentCommand> {
        let customer = match (present(self.customer_id), present(self.email)) {
            (Some(id), _) => CustomerRef::ById(id),
            (None, Some(email)) => CustomerRef::ByEmail(email),
            (None, None) => {
                return Err(PaymentError::InvalidArgument(
                    "Missing customer ID (customerId) or email".to_string(),
                ))
            }
        };

        let amount = match self.amount {
            Some(amount) if amount > MAX_AMOUNT => {
                return Err(PaymentError::InvalidArgument(format!(
                    "amount must be at most {}, got {}",
                    MAX_AMOUNT, amount
                )))
            }
            Some(amount) if amount > 0 => amount,
            Some(amount) => {
                return Err(PaymentError::InvalidArgument(format!(
                    "amount must be a positive integer, got {}",
                    amount
                )))
            }
            None => {
                return Err(PaymentError::InvalidArgument(
                    "amount is required".to_string(),
                ))
            }
        };

        let destination = present(self.owner_stripe_id).ok_or_else(|| {
            PaymentError::InvalidArgument("ownerStripeId is required".to_string())
        })?;

        let currency = present(self.currency)
            .map(|c| c.trim().to_lowercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        let application_fee_amount = application_fee(amount).ok_or_else(|| {
            PaymentError::InvalidArgument(format!("amount {} is out of range", amount))
        })?;

        Ok(PaymentIntentCommand {
            amount,
            currency,
            destination,
            customer,
            application_fee_amount,
        })
    }
}

/// `createPaymentIntent` response, everything the mobile payment sheet needs
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentResult {
    /// Client secret of the payment intent
    pub payment_intent: String,
    /// Secret of the ephemeral key
    pub ephemeral_key: String,
    /// Resolved customer id
    pub customer: String,
}

impl std::fmt::Debug for CreatePaymentIntentResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreatePaymentIntentResult")
            .field("payment_intent", &"<redacted>")
            .field("ephemeral_key", &"<redacted>")
            .field("customer", &self.customer)
            .finish()
    }
}

/// Issues payment intents with destination transfers and a platform fee
#[derive(Clone)]
pub struct PaymentIntentIssuer {
    processor: BoxedPaymentProcessor,
}

impl PaymentIntentIssuer {
    pub fn new(processor: BoxedPaymentProcessor) -> Self {
        Self { processor }
    }

    /// Reject calls without an authenticated caller.
    ///
    /// Runs ahead of payload validation, so an anonymous call is always
    /// `Unauthenticated` whatever it carries.
    pub fn authorize(caller: Option<&CallerIdentity>) -> PaymentResult<&CallerIdentity> {
        caller.ok_or_else(|| {
            PaymentError::Unauthenticated("You must be signed in to create a payment.".to_string())
        })
    }

    /// Issue a payment intent for an authenticated caller.
    #[instrument(
        skip(self, caller, request),
        fields(
            provider = self.processor.provider_name(),
            uid = caller.map(|c| c.uid.as_str()),
            caller_email = caller.and_then(|c| c.email.as_deref())
        )
    )]
    pub async fn issue(
        &self,
        caller: Option<&CallerIdentity>,
        request: CreatePaymentIntentRequest,
    ) -> PaymentResult<CreatePaymentIntentResult> {
        Self::authorize(caller)?;

        let command = request.validate()?;
        let customer_id = self.resolve_customer(&command.customer).await?;

        let ephemeral_key = self
            .processor
            .create_ephemeral_key(&customer_id)
            .await
            .map_err(|e| {
                error!("Ephemeral key creation failed for customer {}: {}", customer_id, e);
                e
            })?;

        let params = PaymentIntentParams {
            amount: command.amount,
            currency: command.currency,
            customer_id: customer_id.clone(),
            destination: command.destination,
            application_fee_amount: command.application_fee_amount,
        };

        let intent = self
            .processor
            .create_payment_intent(&params)
            .await
            .map_err(|e| {
                error!(
                    "Payment intent creation failed for customer {} -> {}: {}",
                    customer_id, params.destination, e
                );
                e
            })?;

        info!(
            "Created payment intent {}: amount={} {}, fee={}, destination={}, customer={}",
            intent.id,
            params.amount,
            params.currency,
            params.application_fee_amount,
            params.destination,
            customer_id
        );

        Ok(CreatePaymentIntentResult {
            payment_intent: intent.client_secret,
            ephemeral_key: ephemeral_key.secret,
            customer: customer_id,
        })
    }

    /// Resolve a customer reference to a processor customer id.
    ///
    /// By email, the first match is used; with no match a customer is
    /// created with just that email.
    pub async fn resolve_customer(&self, customer: &CustomerRef) -> PaymentResult<String> {
        let id = match customer {
            CustomerRef::ById(id) => id.clone(),
            CustomerRef::ByEmail(email) => {
                let existing = self
                    .processor
                    .find_customer_by_email(email)
                    .await
                    .map_err(|e| {
                        error!("Customer lookup by email failed: {}", e);
                        e
                    })?;

                match existing {
                    Some(found) => {
                        debug!("Found existing customer {} by email", found.id);
                        found.id
                    }
                    None => {
                        let created = self
                            .processor
                            .create_customer(&NewCustomer::with_email(email.as_str()))
                            .await
                            .map_err(|e| {
                                error!("Customer creation for email lookup failed: {}", e);
                                e
                            })?;
                        info!("No customer for email, created {}", created.id);
                        created.id
                    }
                }
            }
        };

        if id.is_empty() {
            return Err(PaymentError::InvalidArgument(
                "Missing customer ID (customerId) or email".to_string(),
            ));
        }

        Ok(id)
    }
}
