//! Per-request access records.
//!
//! # Responsibilities
//! - Record status, latency, caller, user agent, method and path
//! - Tag each request with an `x-request-id`
//! - Record exactly once even when a downstream stage panics

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use futures_util::FutureExt;
use uuid::Uuid;

use crate::security::trusted_proxy::ClientIp;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Access logger state: a running count of records written.
#[derive(Debug, Default)]
pub struct AccessLogger {
    records: AtomicU64,
}

impl AccessLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total records written since startup.
    pub fn records(&self) -> u64 {
        self.records.load(Ordering::Relaxed)
    }

    fn record(&self, entry: &AccessEntry, status: StatusCode, latency: Duration) {
        self.records.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            request_id = %entry.request_id,
            status = status.as_u16(),
            latency_ms = latency.as_secs_f64() * 1000.0,
            client = %entry.client,
            user_agent = %entry.user_agent,
            method = %entry.method,
            path = %entry.path,
            "request"
        );
    }
}

struct AccessEntry {
    request_id: Uuid,
    client: String,
    user_agent: String,
    method: Method,
    path: String,
}

impl AccessEntry {
    fn from_request(request: &Request<Body>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            client: request
                .extensions()
                .get::<ClientIp>()
                .map(ToString::to_string)
                .unwrap_or_else(|| "-".to_string()),
            user_agent: request
                .headers()
                .get(header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-")
                .to_string(),
            method: request.method().clone(),
            path: request.uri().path().to_string(),
        }
    }
}

/// Middleware writing one access record per request.
///
/// A panic from further down is recorded as a 500 and then resumed so the
/// panic isolation stage still produces the response.
pub async fn access_log_middleware(
    State(logger): State<Arc<AccessLogger>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let entry = AccessEntry::from_request(&request);

    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(mut response) => {
            logger.record(&entry, response.status(), start.elapsed());
            if let Ok(value) = HeaderValue::from_str(&entry.request_id.to_string()) {
                response.headers_mut().insert(X_REQUEST_ID, value);
            }
            response
        }
        Err(panic) => {
            logger.record(&entry, StatusCode::INTERNAL_SERVER_ERROR, start.elapsed());
            std::panic::resume_unwind(panic)
        }
    }
}
