//! Fixed-window rate limiting keyed by caller identity.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::config::RateLimitConfig;
use crate::http::response::ApiResponse;
use crate::security::trusted_proxy::ClientIp;

pub const RATE_LIMITED_MESSAGE: &str = "You are being rate limited";

/// Longest accepted window. Longer values are clamped.
pub const MAX_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Per-caller request counter for the current window.
#[derive(Debug, Clone)]
struct RateBucket {
    count: u32,
    window_expiry: Instant,
    rejected: u32,
}

impl RateBucket {
    fn new(now: Instant, window: Duration) -> Self {
        Self {
            count: 0,
            window_expiry: now + window,
            rejected: 0,
        }
    }
}

/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the caller's window resets.
    pub reset_after: Duration,
    /// True only for the first rejection of a window.
    pub first_rejection: bool,
}

impl RateDecision {
    fn apply_headers(&self, headers: &mut HeaderMap) {
        headers.insert("x-ratelimit-limit", HeaderValue::from(self.limit));
        headers.insert("x-ratelimit-remaining", HeaderValue::from(self.remaining));
        headers.insert("x-ratelimit-reset", HeaderValue::from(ceil_secs(self.reset_after)));
    }
}

fn ceil_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}

/// Fixed-window limiter owning every caller's bucket.
///
/// Admission and window reset for one key happen under that key's map
/// entry guard, so concurrent requests from the same caller cannot lose
/// an update or admit more than `max_requests` per window.
pub struct RateLimiter {
    buckets: DashMap<String, RateBucket>,
    max_requests: u32,
    window: Duration,
    enabled: bool,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            buckets: DashMap::new(),
            max_requests,
            window: window.min(MAX_WINDOW),
            enabled: true,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self {
            enabled: config.enabled,
            ..Self::new(config.max_requests, Duration::from_secs(config.window_secs))
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Number of tracked callers.
    pub fn tracked(&self) -> usize {
        self.buckets.len()
    }

    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    /// Admission check against an explicit clock reading.
    pub fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let mut bucket = self
            .buckets
            .entry(key.to_owned())
            .or_insert_with(|| RateBucket::new(now, self.window));

        if now > bucket.window_expiry {
            *bucket = RateBucket::new(now, self.window);
        }

        let allowed = bucket.count < self.max_requests;
        if allowed {
            bucket.count += 1;
        } else {
            bucket.rejected = bucket.rejected.saturating_add(1);
        }

        RateDecision {
            allowed,
            limit: self.max_requests,
            remaining: self.max_requests - bucket.count,
            reset_after: bucket.window_expiry.saturating_duration_since(now),
            first_rejection: !allowed && bucket.rejected == 1,
        }
    }

    /// Drop buckets whose window has ended. A dropped bucket behaves exactly
    /// like a fresh one on the caller's next request.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let before = self.buckets.len();
        self.buckets.retain(|_, bucket| now <= bucket.window_expiry);
        before.saturating_sub(self.buckets.len())
    }

    /// Periodically purge expired buckets until shutdown.
    pub async fn run_sweeper(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.window);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let purged = self.purge_expired();
                    if purged > 0 {
                        tracing::debug!(purged, tracked = self.tracked(), "Purged expired rate buckets");
                    }
                }
                _ = shutdown.recv() => break,
            }
        }
    }
}

/// Middleware enforcing the per-caller quota.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !limiter.is_enabled() {
        return next.run(request).await;
    }

    let key = match request.extensions().get::<ClientIp>() {
        Some(client) => client.key(),
        None => {
            tracing::debug!("No resolved client address, using shared bucket");
            "unknown".to_string()
        }
    };

    let decision = limiter.check(&key);

    if !decision.allowed {
        if decision.first_rejection {
            tracing::warn!(
                client = %key,
                limit = decision.limit,
                reset_after_secs = ceil_secs(decision.reset_after),
                "Rate limit exceeded"
            );
        }

        let mut response = (
            StatusCode::TOO_MANY_REQUESTS,
            ApiResponse::failure(RATE_LIMITED_MESSAGE),
        )
            .into_response();
        decision.apply_headers(response.headers_mut());
        response
            .headers_mut()
            .insert("retry-after", HeaderValue::from(ceil_secs(decision.reset_after)));
        return response;
    }

    let mut response = next.run(request).await;
    decision.apply_headers(response.headers_mut());
    response
}
