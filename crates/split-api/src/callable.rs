//! # Callable Envelope
//!
//! Wire format of the callable operations:
//!
//! ```text
//! request   {"data": <payload>}
//! success   200 {"result": <response>}
//! failure   4xx/5xx {"error": {"status": "INVALID_ARGUMENT", "message": "..."}}
//! ```

use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use split_core::{ErrorKind, PaymentError};
use thiserror::Error;
use tracing::{error, warn};

/// Request envelope
#[derive(Debug, Deserialize)]
pub struct CallableRequest<T> {
    pub data: T,
}

/// Success envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct CallableResponse<T> {
    pub result: T,
}

impl<T> CallableResponse<T> {
    pub fn new(result: T) -> Self {
        Self { result }
    }
}

/// Failure envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: CallableError,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CallableError {
    pub status: ErrorKind,
    pub message: String,
}

/// Extracts the payload of a callable request.
///
/// A body that is not a valid envelope is `INVALID_ARGUMENT`.
pub struct Callable<T>(pub T);

impl<S, T> FromRequest<S> for Callable<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(envelope) = Json::<CallableRequest<T>>::from_request(req, state)
            .await
            .map_err(|rejection| {
                ApiError(PaymentError::InvalidArgument(rejection.body_text()))
            })?;
        Ok(Callable(envelope.data))
    }
}

/// Handler error, rendered as the failure envelope
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub PaymentError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        if self.0.is_upstream() {
            error!("Processor call failed: {}", self.0);
        } else if kind == ErrorKind::Internal {
            error!("Callable failed: {}", self.0);
        } else {
            warn!("Callable rejected: {}", self.0);
        }

        let status =
            StatusCode::from_u16(kind.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse {
            error: CallableError {
                status: kind,
                message: self.0.message().to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
