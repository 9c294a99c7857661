//! Wallet JSON-RPC client implementation.

use crate::error::WalletError;
use crate::types::*;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Characters of a response body shown in debug logs.
const BODY_PREVIEW_CHARS: usize = 200;

/// Client for a wallet exposing the EIP-1193 request interface over HTTP.
#[derive(Clone, Debug)]
pub struct WalletClient {
    client: Client,
    rpc_url: String,
    next_id: Arc<AtomicU64>,
}

impl WalletClient {
    /// Create a new wallet client.
    pub fn new(rpc_url: impl Into<String>, timeout: Duration) -> Result<Self, WalletError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            rpc_url: rpc_url.into(),
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Ask the wallet for its connected accounts, prompting the user if needed.
    #[instrument(skip(self))]
    pub async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        let accounts: Vec<String> = self.call(REQUEST_ACCOUNTS).await?;
        debug!("Wallet returned {} accounts", accounts.len());
        Ok(accounts)
    }

    /// The first connected account, used as the display address.
    pub async fn connected_address(&self) -> Result<String, WalletError> {
        self.request_accounts()
            .await?
            .into_iter()
            .next()
            .ok_or(WalletError::NoAccounts)
    }

    /// Issue a parameterless JSON-RPC call.
    async fn call<T: DeserializeOwned>(&self, method: &str) -> Result<T, WalletError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(id, method);

        let response = self
            .client
            .post(&self.rpc_url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());
            warn!("Wallet request failed: {} - {}", status, message);
            return Err(WalletError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        debug!("Response body: {}", preview(&body, BODY_PREVIEW_CHARS));
        let envelope: RpcResponse<T> = serde_json::from_str(&body)?;

        if let Some(error) = envelope.error {
            if error.code == USER_REJECTED_CODE {
                warn!("Wallet request rejected by user");
                return Err(WalletError::Rejected(error.message));
            }
            return Err(WalletError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        envelope.result.ok_or(WalletError::EmptyResponse)
    }
}

/// Leading `max_chars` characters of `text`, cut on a char boundary.
fn preview(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(i, _)| &text[..i])
}
