//! # Request Handlers
//!
//! Axum handlers for the callable operations. Each one unwraps the
//! envelope, delegates to its `split-core` handler and wraps the result.

use crate::auth::Caller;
use crate::callable::{ApiError, Callable, CallableResponse};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use split_core::{
    CreateCustomerRequest, CreateCustomerResult, CreatePaymentIntentRequest,
    CreatePaymentIntentResult, PaymentIntentIssuer,
};
use tracing::{info, instrument};

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "split-pay",
        "provider": state.provider,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// `createCustomer`: create a customer with a best-effort default card
#[instrument(skip_all)]
pub async fn create_customer(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Callable(request): Callable<CreateCustomerRequest>,
) -> Result<Json<CallableResponse<CreateCustomerResult>>, ApiError> {
    let outcome = state.provisioner.provision(caller.as_ref(), request).await?;

    if let Some(reason) = outcome.reason() {
        info!("createCustomer degraded: {}", reason);
    }

    Ok(Json(CallableResponse::new(outcome.into_value())))
}

/// `createPaymentIntent`: payment intent and ephemeral key for the mobile client
#[instrument(skip_all)]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Caller(caller): Caller,
    payload: Result<Callable<CreatePaymentIntentRequest>, ApiError>,
) -> Result<Json<CallableResponse<CreatePaymentIntentResult>>, ApiError> {
    PaymentIntentIssuer::authorize(caller.as_ref())?;
    let Callable(request) = payload?;

    let result = state.issuer.issue(caller.as_ref(), request).await?;

    Ok(Json(CallableResponse::new(result)))
}

#[cfg(test)]
mod tests {
    use crate::auth::JwtCallerVerifier;
    use crate::routes::create_router;
    use crate::state::{AppConfig, AppState, LogFormat};
    use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use jsonwebtoken::{encode, get_current_timestamp, EncodingKey, Header};
    use serde_json::{json, Value};
    use split_core::{InMemoryProcessor, Operation};
    use std::sync::Arc;

    const SECRET: &[u8] = b"test-caller-secret";

    fn config() -> AppConfig {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            log_format: LogFormat::Pretty,
        }
    }

    fn server(processor: &Arc<InMemoryProcessor>) -> TestServer {
        let state = AppState::with_processor(
            config(),
            processor.clone(),
            "tok_visa",
            Arc::new(JwtCallerVerifier::new(SECRET)),
        );
        TestServer::new(create_router(state)).unwrap()
    }

    fn bearer() -> HeaderValue {
        let claims = json!({ "sub": "uid-1", "exp": get_current_timestamp() + 3600 });
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap();
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let processor = Arc::new(InMemoryProcessor::new());
        let response = server(&processor).get("/health").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["provider"], "in_memory");
    }

    #[tokio::test]
    async fn test_create_customer() {
        let processor = Arc::new(InMemoryProcessor::new());

        let response = server(&processor)
            .post("/createCustomer")
            .json(&json!({ "data": { "email": "ada@example.com", "name": "Ada" } }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        let customer_id = body["result"]["customerId"].as_str().unwrap();
        assert!(customer_id.starts_with("cus_"));
        assert!(body["result"]["paymentMethodId"]
            .as_str()
            .unwrap()
            .starts_with("pm_"));
    }

    #[tokio::test]
    async fn test_create_customer_degrades_on_payment_method_failure() {
        let processor = Arc::new(
            InMemoryProcessor::new().failing_on(Operation::CreatePaymentMethod, "card declined"),
        );

        let response = server(&processor)
            .post("/createCustomer")
            .json(&json!({ "data": { "email": "new@x.com", "name": "New User" } }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body["result"]["customerId"].as_str().is_some());
        assert_eq!(body["result"]["paymentMethodId"], Value::Null);
    }

    #[tokio::test]
    async fn test_create_customer_failure_is_internal() {
        let processor = Arc::new(
            InMemoryProcessor::new().failing_on(Operation::CreateCustomer, "Invalid email address"),
        );

        let response = server(&processor)
            .post("/createCustomer")
            .json(&json!({ "data": { "email": "nope", "name": "X" } }))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["error"]["status"], "INTERNAL");
        assert_eq!(body["error"]["message"], "Invalid email address");
    }

    #[tokio::test]
    async fn test_create_customer_without_name() {
        let processor = Arc::new(InMemoryProcessor::new());

        let response = server(&processor)
            .post("/createCustomer")
            .json(&json!({ "data": { "email": "a@b.co" } }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body["result"]["customerId"].as_str().is_some());
        assert_eq!(processor.call_count(Operation::CreateCustomer), 1);
        assert_eq!(processor.customers()[0].name, None);
    }

    #[tokio::test]
    async fn test_payment_intent_amount_out_of_range() {
        let processor = Arc::new(InMemoryProcessor::new().with_customer("cus_1", None));

        let response = server(&processor)
            .post("/createPaymentIntent")
            .add_header(AUTHORIZATION, bearer())
            .json(&json!({ "data": {
                "customerId": "cus_1",
                "amount": i64::MAX,
                "ownerStripeId": "acct_9"
            }}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"]["status"], "INVALID_ARGUMENT");
        assert!(processor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_envelope_is_invalid_argument() {
        let processor = Arc::new(InMemoryProcessor::new());

        let response = server(&processor)
            .post("/createCustomer")
            .json(&json!({ "email": "ada@example.com", "name": "Ada" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"]["status"], "INVALID_ARGUMENT");
        assert!(processor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_payment_intent_with_customer_id() {
        let processor = Arc::new(InMemoryProcessor::new().with_customer("cus_123", None));

        let response = server(&processor)
            .post("/createPaymentIntent")
            .add_header(AUTHORIZATION, bearer())
            .json(&json!({ "data": {
                "customerId": "cus_123",
                "amount": 2000,
                "currency": "usd",
                "ownerStripeId": "acct_9"
            }}))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["result"]["customer"], "cus_123");
        assert!(body["result"]["paymentIntent"]
            .as_str()
            .unwrap()
            .contains("_secret_"));
        assert!(body["result"]["ephemeralKey"].as_str().is_some());

        let intents = processor.payment_intents();
        assert_eq!(intents[0].application_fee_amount, 200);
        assert_eq!(intents[0].destination, "acct_9");
    }

    #[tokio::test]
    async fn test_payment_intent_requires_auth() {
        let processor = Arc::new(InMemoryProcessor::new().with_customer("cus_123", None));
        let server = server(&processor);

        let payloads = [
            json!({ "data": { "customerId": "cus_123", "amount": 2000, "ownerStripeId": "acct_9" } }),
            json!({ "data": {} }),
            json!({ "not": "an envelope" }),
        ];

        for payload in &payloads {
            let response = server.post("/createPaymentIntent").json(payload).await;

            response.assert_status(StatusCode::UNAUTHORIZED);
            let body: Value = response.json();
            assert_eq!(body["error"]["status"], "UNAUTHENTICATED");
        }

        let response = server
            .post("/createPaymentIntent")
            .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer forged.token.value"))
            .json(&payloads[0])
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        assert!(processor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_payment_intent_without_customer_is_invalid() {
        let processor = Arc::new(InMemoryProcessor::new());

        let response = server(&processor)
            .post("/createPaymentIntent")
            .add_header(AUTHORIZATION, bearer())
            .json(&json!({ "data": { "amount": 1000, "ownerStripeId": "acct_9" } }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"]["status"], "INVALID_ARGUMENT");
        assert!(processor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_payment_intent_by_email_creates_then_reuses() {
        let processor = Arc::new(InMemoryProcessor::new());
        let server = server(&processor);
        let payload = json!({ "data": {
            "email": "buyer@x.com",
            "amount": 5,
            "ownerStripeId": "acct_9"
        }});

        let first: Value = server
            .post("/createPaymentIntent")
            .add_header(AUTHORIZATION, bearer())
            .json(&payload)
            .await
            .json();
        let second: Value = server
            .post("/createPaymentIntent")
            .add_header(AUTHORIZATION, bearer())
            .json(&payload)
            .await
            .json();

        assert_eq!(first["result"]["customer"], second["result"]["customer"]);
        assert_eq!(processor.customers().len(), 1);
        assert_eq!(processor.call_count(Operation::CreateCustomer), 1);

        let intents = processor.payment_intents();
        assert_eq!(intents.len(), 2);
        assert_eq!(intents[0].application_fee_amount, 1);
        assert_eq!(intents[0].currency, "usd");
    }

    #[tokio::test]
    async fn test_payment_intent_upstream_failure_is_internal() {
        let processor = Arc::new(
            InMemoryProcessor::new()
                .with_customer("cus_1", None)
                .failing_on(Operation::CreatePaymentIntent, "No such destination: 'acct_9'"),
        );

        let response = server(&processor)
            .post("/createPaymentIntent")
            .add_header(AUTHORIZATION, bearer())
            .json(&json!({ "data": {
                "customerId": "cus_1",
                "amount": 1000,
                "ownerStripeId": "acct_9"
            }}))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["error"]["status"], "INTERNAL");
        assert_eq!(body["error"]["message"], "No such destination: 'acct_9'");
    }
}
