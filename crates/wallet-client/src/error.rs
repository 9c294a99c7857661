//! Wallet bridge errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Request rejected by user: {0}")]
    Rejected(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Wallet returned no accounts")]
    NoAccounts,

    #[error("Empty response from wallet")]
    EmptyResponse,
}

impl WalletError {
    /// Whether the user declined the request in their wallet.
    pub fn is_rejection(&self) -> bool {
        matches!(self, WalletError::Rejected(_))
    }
}
