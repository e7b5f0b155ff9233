//! Store liveness monitoring.
//!
//! # Responsibilities
//! - Periodically probe the shared store connection
//! - Track consecutive probe failures
//! - Escalate persistent loss as a fatal error for the process to act on

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::config::LivenessConfig;
use crate::store::{CounterStore, StoreError};

/// Longest accepted probe interval or probe timeout. Longer values are clamped.
pub const MAX_PROBE_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Raised when the store stays unreachable for `failure_threshold` probes.
#[derive(Debug, Error)]
pub enum LivenessError {
    #[error("store lost after {failures} consecutive failed probes: {source}")]
    StoreLost {
        failures: u32,
        #[source]
        source: StoreError,
    },
}

/// Probe bookkeeping, owned by the monitor alone.
#[derive(Debug, Clone, Default)]
pub struct LivenessState {
    pub last_probe: Option<Instant>,
    pub consecutive_failures: u32,
}

/// Background task guarding the store connection.
pub struct LivenessMonitor {
    store: Arc<dyn CounterStore>,
    interval: Duration,
    probe_timeout: Duration,
    failure_threshold: u32,
    state: LivenessState,
}

impl LivenessMonitor {
    pub fn new(
        store: Arc<dyn CounterStore>,
        interval: Duration,
        probe_timeout: Duration,
        failure_threshold: u32,
    ) -> Self {
        Self {
            store,
            interval: interval.min(MAX_PROBE_PERIOD),
            probe_timeout: probe_timeout.min(MAX_PROBE_PERIOD),
            failure_threshold: failure_threshold.max(1),
            state: LivenessState::default(),
        }
    }

    pub fn from_config(store: Arc<dyn CounterStore>, config: &LivenessConfig) -> Self {
        Self::new(
            store,
            Duration::from_secs(config.interval_secs),
            Duration::from_secs(config.probe_timeout_secs),
            config.failure_threshold,
        )
    }

    pub fn state(&self) -> &LivenessState {
        &self.state
    }

    /// Probe every interval until shutdown (`Ok`) or until the failure
    /// threshold is reached (`Err`). The first probe happens one interval
    /// after start.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> Result<(), LivenessError> {
        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            failure_threshold = self.failure_threshold,
            store = self.store.kind(),
            "Liveness monitor starting"
        );

        let mut ticker = time::interval_at(time::Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.probe_once().await?;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Liveness monitor received shutdown signal, exiting loop");
                    return Ok(());
                }
            }
        }
    }

    /// Run a single probe and update the failure count.
    pub async fn probe_once(&mut self) -> Result<(), LivenessError> {
        let started = Instant::now();
        self.state.last_probe = Some(started);

        let result = match time::timeout(self.probe_timeout, self.store.ping()).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout),
        };

        match result {
            Ok(()) => {
                if self.state.consecutive_failures > 0 {
                    tracing::info!(
                        previous_failures = self.state.consecutive_failures,
                        "Store connection recovered"
                    );
                }
                self.state.consecutive_failures = 0;
                tracing::debug!(latency_ms = started.elapsed().as_millis() as u64, "Store heartbeat");
                Ok(())
            }
            Err(e) => {
                self.state.consecutive_failures += 1;
                let failures = self.state.consecutive_failures;

                if failures >= self.failure_threshold {
                    tracing::error!(failures, error = %e, "Store liveness probe failed, giving up");
                    Err(LivenessError::StoreLost { failures, source: e })
                } else {
                    tracing::warn!(
                        failures,
                        threshold = self.failure_threshold,
                        error = %e,
                        "Store liveness probe failed"
                    );
                    Ok(())
                }
            }
        }
    }
}
