//! Best-effort visit accounting.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tokio::task::JoinHandle;

use crate::store::CounterStore;

/// Increments the shared visit counter without holding up the request.
pub struct VisitCounter {
    store: Arc<dyn CounterStore>,
    key: String,
}

impl VisitCounter {
    pub fn new(store: Arc<dyn CounterStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Spawn one increment. Failures are logged and otherwise dropped.
    pub fn record(&self) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let key = self.key.clone();

        tokio::spawn(async move {
            if let Err(e) = store.increment(&key).await {
                tracing::warn!(key = %key, store = store.kind(), error = %e, "Failed to count visit");
            }
        })
    }
}

pub async fn visit_counter_middleware(
    State(counter): State<Arc<VisitCounter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    counter.record();
    next.run(request).await
}
