//! Rate limiting middleware using Governor.
//!
//! One token bucket per caller. Requests that passed the admin gate are
//! bucketed by key; everything else by the peer address. `X-Forwarded-For`
//! is only believed when the server sits behind a trusted proxy.

use std::{net::SocketAddr, num::NonZeroU32, sync::Arc, time::Duration};

use axum::{
    Json,
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use serde_json::json;

use super::auth::VerifiedKey;

/// How often idle buckets are dropped.
pub const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

/// Rate limiter state shared across requests.
pub struct RateLimiterState {
    /// Buckets keyed by caller
    limiter: DefaultKeyedRateLimiter<String>,
    /// Take the client address from `X-Forwarded-For`
    trust_forwarded_for: bool,
}

impl Default for RateLimiterState {
    fn default() -> Self {
        Self::per_minute(100)
    }
}

impl RateLimiterState {
    /// Allows `requests` per `period` per caller, with bursts up to the same size.
    /// Zero requests is treated as one.
    pub fn new(requests: u32, period: Duration) -> Self {
        let requests = NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN);
        let replenish = period / requests.get();
        let quota = Quota::with_period(replenish)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MAX))
            .allow_burst(requests);

        Self {
            limiter: RateLimiter::keyed(quota),
            trust_forwarded_for: false,
        }
    }

    /// Allows `requests` per minute per caller.
    pub fn per_minute(requests: u32) -> Self {
        Self::new(requests, Duration::from_secs(60))
    }

    /// Believe the first `X-Forwarded-For` entry as the client address.
    pub fn trusting_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }

    /// Checks if a request should be rate limited.
    /// Returns true if the request is allowed, false if rate limited.
    pub fn check(&self, key: &str) -> bool {
        self.limiter.check_key(&key.to_string()).is_ok()
    }

    /// Drops buckets that have refilled completely.
    pub fn evict_idle(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Number of callers currently tracked.
    pub fn tracked_callers(&self) -> usize {
        self.limiter.len()
    }

    /// Bucket key for a request.
    fn caller_key(&self, request: &Request<Body>) -> String {
        if let Some(VerifiedKey(hash)) = request.extensions().get::<VerifiedKey>() {
            return format!("key:{}", hash);
        }

        if self.trust_forwarded_for {
            let forwarded = request
                .headers()
                .get("X-Forwarded-For")
                .and_then(|h| h.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|ip| !ip.is_empty());
            if let Some(ip) = forwarded {
                return format!("ip:{}", ip);
            }
        }

        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| format!("ip:{}", addr.ip()))
            .unwrap_or_else(|| "anonymous".to_string())
    }
}

/// Periodically evicts idle buckets so one-off callers don't accumulate.
pub fn spawn_eviction(limiter: Arc<RateLimiterState>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(EVICTION_INTERVAL);
        loop {
            ticker.tick().await;
            limiter.evict_idle();
            tracing::debug!(callers = limiter.tracked_callers(), "Rate limit buckets pruned");
        }
    })
}

/// Rate limiting middleware.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Skip rate limiting for health endpoint
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let key = limiter.caller_key(&request);

    if !limiter.check(&key) {
        tracing::warn!(caller = %key, "Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "Rate limit exceeded. Please try again later.",
                "code": 429,
                "retryAfterSeconds": 60
            })),
        )
            .into_response();
    }

    next.run(request).await
}
