//! Orange Gateway - shareable payment requests with local bookkeeping.
//!
//! Serves the dashboard API for creating, listing and deleting payment
//! gateways, the `/pay/<id>` checkout surface their links resolve to, and a
//! thin wallet bridge used only to display a connected address.

pub mod api;
pub mod config;
pub mod error;
pub mod flow;

pub use config::Config;
pub use error::ApiError;
