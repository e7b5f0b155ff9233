//! Request-processing pipeline.
//!
//! # Stage Order
//! ```text
//! ResolveClient → IsolatePanics → AccessLog → Cors → RateLimit → CountVisit → routes
//! ```
//!
//! The order lives in [`STAGES`] and is applied by [`Pipeline::apply`], so it
//! can be inspected and tested instead of being implied by registration order.
//!
//! # Design Decisions
//! - Outer stages always run; only Cors, RateLimit and IsolatePanics may answer
//!   a request themselves
//! - Each stage's state is constructed once and shared via Arc

pub mod visits;

use std::sync::Arc;

use axum::{middleware::from_fn_with_state, Router};

use crate::config::{AppConfig, CorsConfig};
use crate::observability::access_log::{access_log_middleware, AccessLogger};
use crate::resilience::catch_panic_layer;
use crate::security::cors::cors_layer;
use crate::security::rate_limit::{rate_limit_middleware, RateLimiter};
use crate::security::trusted_proxy::{resolve_client_middleware, TrustedProxies};
use crate::store::CounterStore;
use visits::{visit_counter_middleware, VisitCounter};

/// One cross-cutting step of request handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolveClient,
    IsolatePanics,
    AccessLog,
    Cors,
    RateLimit,
    CountVisit,
}

/// Outermost first.
pub const STAGES: [Stage; 6] = [
    Stage::ResolveClient,
    Stage::IsolatePanics,
    Stage::AccessLog,
    Stage::Cors,
    Stage::RateLimit,
    Stage::CountVisit,
];

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::ResolveClient => "resolve_client",
            Stage::IsolatePanics => "isolate_panics",
            Stage::AccessLog => "access_log",
            Stage::Cors => "cors",
            Stage::RateLimit => "rate_limit",
            Stage::CountVisit => "count_visit",
        }
    }

    /// Whether the stage can produce a response without calling inward.
    pub fn can_short_circuit(&self) -> bool {
        matches!(self, Stage::IsolatePanics | Stage::Cors | Stage::RateLimit)
    }

    /// Whether the stage sees every request, including rejected ones.
    pub fn always_runs(&self) -> bool {
        let position = STAGES.iter().position(|s| s == self).unwrap_or(STAGES.len());
        !STAGES[..position].iter().any(|s| *s != Stage::IsolatePanics && s.can_short_circuit())
    }
}

/// State for every stage, built once per process.
#[derive(Clone)]
pub struct Pipeline {
    pub proxies: Arc<TrustedProxies>,
    pub access_log: Arc<AccessLogger>,
    pub cors: CorsConfig,
    pub limiter: Arc<RateLimiter>,
    pub visits: Arc<VisitCounter>,
}

impl Pipeline {
    pub fn from_config(config: &AppConfig, store: Arc<dyn CounterStore>) -> Self {
        Self {
            proxies: Arc::new(TrustedProxies::from_config(&config.proxy)),
            access_log: Arc::new(AccessLogger::new()),
            cors: config.cors.clone(),
            limiter: Arc::new(RateLimiter::from_config(&config.rate_limit)),
            visits: Arc::new(VisitCounter::new(store, config.store.visits_key.clone())),
        }
    }

    /// Wrap `router` in every stage, [`STAGES`]`[0]` outermost.
    pub fn apply(&self, router: Router) -> Router {
        STAGES
            .iter()
            .rev()
            .fold(router, |router, stage| self.layer(router, *stage))
    }

    fn layer(&self, router: Router, stage: Stage) -> Router {
        match stage {
            Stage::ResolveClient => router.layer(from_fn_with_state(
                self.proxies.clone(),
                resolve_client_middleware,
            )),
            Stage::IsolatePanics => router.layer(catch_panic_layer()),
            Stage::AccessLog => router.layer(from_fn_with_state(
                self.access_log.clone(),
                access_log_middleware,
            )),
            Stage::Cors => router.layer(cors_layer(&self.cors)),
            Stage::RateLimit => router.layer(from_fn_with_state(
                self.limiter.clone(),
                rate_limit_middleware,
            )),
            Stage::CountVisit => router.layer(from_fn_with_state(
                self.visits.clone(),
                visit_counter_middleware,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_order_is_fixed() {
        let names: Vec<_> = STAGES.iter().map(Stage::name).collect();
        assert_eq!(
            names,
            vec!["resolve_client", "isolate_panics", "access_log", "cors", "rate_limit", "count_visit"]
        );
    }

    #[test]
    fn logging_wraps_every_rejection() {
        assert!(Stage::ResolveClient.always_runs());
        assert!(Stage::IsolatePanics.always_runs());
        assert!(Stage::AccessLog.always_runs());
        assert!(Stage::Cors.always_runs());
        assert!(!Stage::RateLimit.always_runs());
        assert!(!Stage::CountVisit.always_runs());
    }

    #[test]
    fn only_policy_stages_short_circuit() {
        let short: Vec<_> = STAGES.iter().filter(|s| s.can_short_circuit()).collect();
        assert_eq!(short, vec![&Stage::IsolatePanics, &Stage::Cors, &Stage::RateLimit]);
    }
}
