//! # Customer Provisioning
//!
//! Creates a customer and gives it a default card.
//!
//! Creating the customer is the guarantee of this operation. Attaching the
//! placeholder card is best effort: if any step of it fails the customer is
//! still returned, with no payment method and a `PartialSuccess` outcome.

use crate::error::PaymentResult;
use crate::models::{CallerIdentity, NewCustomer, PaymentMethod};
use crate::outcome::Outcome;
use crate::processor::BoxedPaymentProcessor;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

/// `createCustomer` payload.
///
/// Both fields go to the processor as given; it decides what is acceptable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCustomerRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl CreateCustomerRequest {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            name: Some(name.into()),
        }
    }
}

impl From<CreateCustomerRequest> for NewCustomer {
    fn from(request: CreateCustomerRequest) -> Self {
        NewCustomer {
            email: request.email,
            name: request.name,
        }
    }
}

/// `createCustomer` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerResult {
    pub customer_id: String,
    /// `None` when the best-effort card attachment failed
    pub payment_method_id: Option<String>,
}

/// Creates customers with a best-effort default payment method
#[derive(Clone)]
pub struct CustomerProvisioner {
    processor: BoxedPaymentProcessor,
    card_token: String,
}

impl CustomerProvisioner {
    /// `card_token` is the tokenized card used for the placeholder payment method
    pub fn new(processor: BoxedPaymentProcessor, card_token: impl Into<String>) -> Self {
        Self {
            processor,
            card_token: card_token.into(),
        }
    }

    /// Create the customer, then try to attach a default card.
    ///
    /// Fails only if the customer itself could not be created.
    #[instrument(
        skip(self, caller, request),
        fields(
            provider = self.processor.provider_name(),
            uid = caller.map(|c| c.uid.as_str()),
            caller_email = caller.and_then(|c| c.email.as_deref())
        )
    )]
    pub async fn provision(
        &self,
        caller: Option<&CallerIdentity>,
        request: CreateCustomerRequest,
    ) -> PaymentResult<Outcome<CreateCustomerResult>> {
        let customer = self
            .processor
            .create_customer(&NewCustomer::from(request))
            .await
            .map_err(|e| {
                error!("Error creating customer: {}", e);
                e
            })?;

        info!("Customer created with ID: {}", customer.id);

        match self.attach_default_card(&customer.id).await {
            Ok(method) => {
                info!(
                    "Created and attached payment method {} to customer {}",
                    method.id, customer.id
                );
                Ok(Outcome::Success(CreateCustomerResult {
                    customer_id: customer.id,
                    payment_method_id: Some(method.id),
                }))
            }
            Err(e) => {
                warn!(
                    "Error with payment method for customer {}, continuing without one: {}",
                    customer.id, e
                );
                Ok(Outcome::PartialSuccess {
                    value: CreateCustomerResult {
                        customer_id: customer.id,
                        payment_method_id: None,
                    },
                    reason: e.message().to_string(),
                })
            }
        }
    }

    /// Create, attach and default the placeholder card
    async fn attach_default_card(&self, customer_id: &str) -> PaymentResult<PaymentMethod> {
        let method = self
            .processor
            .create_card_payment_method(&self.card_token)
            .await?;
        let method = self
            .processor
            .attach_payment_method(&method.id, customer_id)
            .await?;
        self.processor
            .set_default_payment_method(customer_id, &method.id)
            .await?;
        Ok(method)
    }
}
