//! Error types for the gateway service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gateway_store::GatewayError;
use serde::Serialize;
use thiserror::Error;
use wallet_client::WalletError;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Gateway not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid payment amount: {0}")]
    InvalidAmount(String),

    #[error("Payment method unavailable: {0}")]
    MethodUnavailable(String),

    #[error("Wallet request rejected: {0}")]
    WalletRejected(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ApiError::InvalidAmount(_) => (StatusCode::BAD_REQUEST, "INVALID_AMOUNT"),
            ApiError::MethodUnavailable(_) => (StatusCode::CONFLICT, "METHOD_UNAVAILABLE"),
            ApiError::WalletRejected(_) => (StatusCode::FORBIDDEN, "WALLET_REJECTED"),
            ApiError::Wallet(_) => (StatusCode::BAD_GATEWAY, "WALLET_ERROR"),
            ApiError::RateLimitExceeded => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT_EXCEEDED"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::NotFound(id) => ApiError::NotFound(id),
            GatewayError::InvalidAmount(amount) => ApiError::InvalidAmount(amount.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<WalletError> for ApiError {
    fn from(e: WalletError) -> Self {
        match e {
            WalletError::Rejected(message) => ApiError::WalletRejected(message),
            other => ApiError::Wallet(other.to_string()),
        }
    }
}
