//! Wallet bridge client.
//!
//! Talks JSON-RPC 2.0 to a wallet that exposes the EIP-1193 request
//! interface over HTTP. Only account listing is supported; nothing is signed.

mod client;
mod error;
mod types;

pub use client::WalletClient;
pub use error::WalletError;
pub use types::*;
