//! # Stripe Client
//!
//! `PaymentProcessor` over the Stripe REST API.

use crate::config::StripeConfig;
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use split_core::{
    Customer, EphemeralKey, NewCustomer, PaymentError, PaymentIntent, PaymentIntentParams,
    PaymentMethod, PaymentProcessor, PaymentResult,
};
use tracing::{debug, error, instrument};

/// Stripe API client
///
/// Holds the HTTP connection pool; cheap to share behind an `Arc`.
pub struct StripeClient {
    config: StripeConfig,
    client: Client,
}

impl StripeClient {
    /// Create a new Stripe client
    pub fn new(config: StripeConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        let config = StripeConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str, api_version: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.api_base_url, path);
        self.client
            .request(method, url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", api_version)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.request(Method::POST, path, &self.config.api_version)
    }

    /// Send a request and decode the JSON body, mapping Stripe errors
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> PaymentResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            // Parse Stripe error
            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                if let Some(code) = &error_response.error.code {
                    debug!(
                        "Stripe error code={}, param={:?}",
                        code, error_response.error.param
                    );
                }
                return Err(PaymentError::ProviderError {
                    provider: "stripe".to_string(),
                    message: error_response.error.message,
                });
            }

            return Err(PaymentError::ProviderError {
                provider: "stripe".to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

#[async_trait]
impl PaymentProcessor for StripeClient {
    #[instrument(skip(self, customer))]
    async fn create_customer(&self, customer: &NewCustomer) -> PaymentResult<Customer> {
        let mut form_params: Vec<(&str, &str)> = Vec::new();
        if let Some(ref email) = customer.email {
            form_params.push(("email", email.as_str()));
        }
        if let Some(ref name) = customer.name {
            form_params.push(("name", name.as_str()));
        }

        let created: StripeCustomer = self
            .send(self.post("/v1/customers").form(&form_params))
            .await?;

        Ok(created.into())
    }

    #[instrument(skip(self, email))]
    async fn find_customer_by_email(&self, email: &str) -> PaymentResult<Option<Customer>> {
        let request = self
            .request(Method::GET, "/v1/customers", &self.config.api_version)
            .query(&[("email", email), ("limit", "1")]);

        let list: StripeList<StripeCustomer> = self.send(request).await?;

        Ok(list.data.into_iter().next().map(Customer::from))
    }

    #[instrument(skip(self, token))]
    async fn create_card_payment_method(&self, token: &str) -> PaymentResult<PaymentMethod> {
        let form_params = [("type", "card"), ("card[token]", token)];

        let method: StripePaymentMethod = self
            .send(self.post("/v1/payment_methods").form(&form_params))
            .await?;

        Ok(method.into())
    }

    #[instrument(skip(self))]
    async fn attach_payment_method(
        &self,
        payment_method_id: &str,
        customer_id: &str,
    ) -> PaymentResult<PaymentMethod> {
        let path = format!("/v1/payment_methods/{}/attach", payment_method_id);

        let method: StripePaymentMethod = self
            .send(self.post(&path).form(&[("customer", customer_id)]))
            .await?;

        Ok(method.into())
    }

    #[instrument(skip(self))]
    async fn set_default_payment_method(
        &self,
        customer_id: &str,
        payment_method_id: &str,
    ) -> PaymentResult<Customer> {
        let path = format!("/v1/customers/{}", customer_id);
        let form_params = [(
            "invoice_settings[default_payment_method]",
            payment_method_id,
        )];

        let updated: StripeCustomer = self.send(self.post(&path).form(&form_params)).await?;

        Ok(updated.into())
    }

    #[instrument(skip(self))]
    async fn create_ephemeral_key(&self, customer_id: &str) -> PaymentResult<EphemeralKey> {
        let request = self
            .request(
                Method::POST,
                "/v1/ephemeral_keys",
                &self.config.ephemeral_key_api_version,
            )
            .form(&[("customer", customer_id)]);

        let key: StripeEphemeralKey = self.send(request).await?;

        Ok(EphemeralKey {
            id: key.id,
            secret: key.secret,
            expires_at: key.expires.and_then(|ts| DateTime::from_timestamp(ts, 0)),
        })
    }

    #[instrument(skip(self, params), fields(amount = params.amount, customer = %params.customer_id))]
    async fn create_payment_intent(
        &self,
        params: &PaymentIntentParams,
    ) -> PaymentResult<PaymentIntent> {
        let amount = params.amount.to_string();
        let fee = params.application_fee_amount.to_string();
        let form_params = [
            ("amount", amount.as_str()),
            ("currency", params.currency.as_str()),
            ("customer", params.customer_id.as_str()),
            ("transfer_data[destination]", params.destination.as_str()),
            ("on_behalf_of", params.destination.as_str()),
            ("application_fee_amount", fee.as_str()),
            ("automatic_payment_methods[enabled]", "true"),
        ];

        let intent: StripePaymentIntent = self
            .send(self.post("/v1/payment_intents").form(&form_params))
            .await?;

        let client_secret = intent.client_secret.ok_or_else(|| {
            PaymentError::Serialization(format!(
                "Payment intent {} has no client_secret",
                intent.id
            ))
        })?;

        Ok(PaymentIntent {
            id: intent.id,
            client_secret,
            amount: intent.amount,
            application_fee_amount: intent.application_fee_amount,
        })
    }

    fn provider_name(&self) -> &'static str {
        "stripe"
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeList<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct StripeCustomer {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl From<StripeCustomer> for Customer {
    fn from(c: StripeCustomer) -> Self {
        Customer {
            id: c.id,
            email: c.email,
            name: c.name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StripePaymentMethod {
    id: String,
    #[serde(default)]
    customer: Option<String>,
}

impl From<StripePaymentMethod> for PaymentMethod {
    fn from(pm: StripePaymentMethod) -> Self {
        PaymentMethod {
            id: pm.id,
            customer: pm.customer,
        }
    }
}

#[derive(Deserialize)]
struct StripeEphemeralKey {
    id: String,
    secret: String,
    #[serde(default)]
    expires: Option<i64>,
}

#[derive(Deserialize)]
struct StripePaymentIntent {
    id: String,
    #[serde(default)]
    client_secret: Option<String>,
    amount: i64,
    #[serde(default)]
    application_fee_amount: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    param: Option<String>,
}
