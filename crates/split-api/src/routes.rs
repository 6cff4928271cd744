//! # Routes
//!
//! Axum router configuration. Callable operations are served at
//! `POST /<operationName>`.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  /health              - Health check (also at /)
/// - POST /createCustomer      - Create customer with default card
/// - POST /createPaymentIntent - Payment intent + ephemeral key (auth required)
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        // Callable operations
        .route("/createCustomer", post(handlers::create_customer))
        .route("/createPaymentIntent", post(handlers::create_payment_intent))
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        // State
        .with_state(state)
}
