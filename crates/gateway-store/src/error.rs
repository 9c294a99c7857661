//! Gateway store errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Gateway not found: {0}")]
    NotFound(String),

    #[error("Invalid payment amount: {0}")]
    InvalidAmount(f64),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("QR encoding failed: {0}")]
    QrEncoding(String),
}

impl From<std::io::Error> for GatewayError {
    fn from(e: std::io::Error) -> Self {
        GatewayError::Storage(e.to_string())
    }
}
