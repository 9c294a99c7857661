//! Request throttling and access logging for the gateway API.

use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{num::NonZeroU32, sync::Arc, time::Instant};
use tracing::{debug, warn};

/// One token bucket for the whole service.
pub type ServiceLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Throttle applied to every API and checkout request.
#[derive(Clone)]
pub struct RateLimitState {
    pub bucket: Arc<ServiceLimiter>,
}

impl RateLimitState {
    /// Budget of `requests_per_minute` shared by all callers; a zero budget still admits one.
    pub fn new(requests_per_minute: u32) -> Self {
        let per_minute = NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN);

        Self {
            bucket: Arc::new(RateLimiter::direct(Quota::per_minute(per_minute))),
        }
    }

    /// Budget no test run can exhaust.
    pub fn permissive() -> Self {
        Self::new(10_000)
    }
}

/// Answers 429 once the shared budget is spent. `/health` is exempt.
pub async fn rate_limit_middleware(
    State(rate_limit): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if request.uri().path() != "/health" && rate_limit.bucket.check().is_err() {
        warn!(path = %request.uri().path(), "Request budget exhausted");
        return Err(ApiError::RateLimitExceeded);
    }

    Ok(next.run(request).await)
}

/// Access log: 5xx responses at `warn`, the rest at `debug`.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    if status.is_server_error() {
        warn!(%method, %uri, %status, ?duration, "Request failed");
    } else {
        debug!(%method, %uri, %status, ?duration, "Request completed");
    }

    response
}
