//! HTTP API for the gateway service.

mod handlers;
mod middleware;
mod types;

pub use handlers::*;
pub use middleware::{logging_middleware, rate_limit_middleware, RateLimitState};
pub use types::*;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use gateway_store::GatewayStore;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use wallet_client::WalletClient;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Gateway records and stats
    pub store: Arc<GatewayStore>,
    /// Wallet bridge, absent when none is configured
    pub wallet: Option<Arc<WalletClient>>,
    /// Simulated checkout processing time
    pub processing_delay: Duration,
}

impl AppState {
    /// Create new application state.
    pub fn new(store: GatewayStore, wallet: Option<WalletClient>, processing_delay: Duration) -> Self {
        Self {
            store: Arc::new(store),
            wallet: wallet.map(Arc::new),
            processing_delay,
        }
    }
}

/// Create the API router with the default rate limit.
pub fn create_router(state: AppState) -> Router {
    create_router_with_rate_limit(state, RateLimitState::new(120))
}

/// Create the API router with custom rate limiting.
pub fn create_router_with_rate_limit(state: AppState, rate_limit: RateLimitState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Gateway management
        .route(
            "/api/gateways",
            get(handlers::list_gateways).post(handlers::create_gateway),
        )
        .route("/api/gateways/preview", post(handlers::preview_gateway))
        .route(
            "/api/gateways/:id",
            get(handlers::get_gateway).delete(handlers::delete_gateway),
        )
        .route("/api/gateways/:id/payments", post(handlers::record_payment))
        .route("/api/gateways/:id/share", get(handlers::share_gateway))
        // Dashboard payments
        .route("/api/pay", post(handlers::pay))
        // Wallet bridge
        .route("/api/wallet/connect", post(handlers::connect_wallet))
        // Shareable links
        .route("/pay/:id", get(handlers::checkout_view))
        .route("/pay/:id/checkout", post(handlers::checkout))
        .layer(axum_middleware::from_fn_with_state(
            rate_limit,
            rate_limit_middleware,
        ))
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
