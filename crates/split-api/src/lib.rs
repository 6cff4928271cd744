//! # split-api
//!
//! HTTP layer for split-pay-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - The two callable operations, wrapped in the `{"data": ...}` /
//!   `{"result": ...}` callable envelope
//! - Caller authentication from bearer ID tokens
//!
//! ## Endpoints
//!
//! | Method | Path | Auth | Description |
//! |--------|------|------|-------------|
//! | GET | `/health` | no | Health check |
//! | POST | `/createCustomer` | optional | Create customer with default card |
//! | POST | `/createPaymentIntent` | required | Payment intent + ephemeral key |

pub mod auth;
pub mod callable;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState, LogFormat};
