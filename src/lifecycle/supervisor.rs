//! Process supervision.
//!
//! Waits on the operator signal, the liveness monitor and the server, and
//! turns whichever finishes first into a shutdown with a reason. Store loss
//! drains the server for a bounded time; a signal waits for a full drain.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};

use crate::health::LivenessError;
use crate::lifecycle::{Shutdown, ShutdownReason};

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("server failed: {0}")]
    Server(#[from] std::io::Error),

    #[error("server task failed: {0}")]
    Join(#[from] JoinError),
}

/// How the process came to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub reason: ShutdownReason,
    /// False when the drain deadline passed and the server was abandoned.
    pub drained: bool,
}

impl Outcome {
    pub fn exit_code(&self) -> u8 {
        self.reason.exit_code()
    }
}

/// Run until one of `signal`, `monitor` or `server` finishes, then shut down.
pub async fn supervise<S>(
    mut server: JoinHandle<Result<(), std::io::Error>>,
    mut monitor: JoinHandle<Result<(), LivenessError>>,
    shutdown: &Shutdown,
    drain_timeout: Duration,
    signal: S,
) -> Result<Outcome, SupervisorError>
where
    S: Future<Output = ()>,
{
    tokio::select! {
        _ = signal => {
            shutdown.trigger(ShutdownReason::Signal);
        }
        result = &mut monitor => {
            match result {
                Ok(Err(e)) => tracing::error!(error = %e, "Backing store lost"),
                Ok(Ok(())) => tracing::warn!("Liveness monitor stopped unexpectedly"),
                Err(e) => tracing::error!(error = %e, "Liveness monitor task failed"),
            }
            shutdown.trigger(ShutdownReason::StoreLost);
        }
        result = &mut server => {
            shutdown.trigger(ShutdownReason::Signal);
            result??;
            return Ok(Outcome {
                reason: shutdown.reason().unwrap_or(ShutdownReason::Signal),
                drained: true,
            });
        }
    }

    let reason = shutdown.reason().unwrap_or(ShutdownReason::Signal);

    if reason != ShutdownReason::StoreLost {
        server.await??;
        return Ok(Outcome { reason, drained: true });
    }

    match tokio::time::timeout(drain_timeout, &mut server).await {
        Ok(result) => {
            result??;
            Ok(Outcome { reason, drained: true })
        }
        Err(_) => {
            tracing::warn!(
                drain_timeout_ms = drain_timeout.as_millis() as u64,
                "Drain deadline reached, abandoning in-flight requests"
            );
            server.abort();
            Ok(Outcome { reason, drained: false })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::pending;

    fn idle_monitor() -> JoinHandle<Result<(), LivenessError>> {
        tokio::spawn(pending())
    }

    fn server_until(shutdown: &Shutdown) -> JoinHandle<Result<(), std::io::Error>> {
        let mut rx = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = rx.recv().await;
            Ok(())
        })
    }

    #[tokio::test]
    async fn signal_is_a_clean_exit() {
        let shutdown = Shutdown::new();
        let server = server_until(&shutdown);

        let outcome = supervise(server, idle_monitor(), &shutdown, Duration::from_secs(1), async {})
            .await
            .unwrap();

        assert_eq!(outcome.reason, ShutdownReason::Signal);
        assert!(outcome.drained);
        assert_eq!(outcome.exit_code(), 0);
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let shutdown = Shutdown::new();
        let server = tokio::spawn(async {
            Err(std::io::Error::new(std::io::ErrorKind::AddrInUse, "taken"))
        });

        let err = supervise(server, idle_monitor(), &shutdown, Duration::from_secs(1), pending())
            .await
            .unwrap_err();

        assert!(matches!(err, SupervisorError::Server(_)));
    }
}
