//! Payment gateway bookkeeping.
//!
//! Holds the list of shareable payment requests and a parallel map of
//! per-request statistics, persisted through a [`Storage`] backend as two
//! JSON slots. Created and deleted together; only stats change afterwards.

mod error;
mod qr;
mod storage;
mod store;
mod types;

pub use error::GatewayError;
pub use qr::{QrEncoder, QrOptions, SvgQrEncoder};
pub use storage::{FileStorage, MemoryStorage, Storage, GATEWAYS_SLOT, STATS_SLOT};
pub use store::GatewayStore;
pub use types::*;
