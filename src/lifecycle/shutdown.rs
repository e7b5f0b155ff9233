//! Shutdown coordination.

use std::sync::OnceLock;

use tokio::sync::broadcast;

/// Why the process is stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Operator signal (Ctrl+C / SIGTERM).
    Signal,
    /// The backing store was declared lost by the liveness monitor.
    StoreLost,
}

impl ShutdownReason {
    /// Process exit status for this reason.
    pub fn exit_code(&self) -> u8 {
        match self {
            ShutdownReason::Signal => 0,
            ShutdownReason::StoreLost => 1,
        }
    }
}

/// Coordinator for shutdown.
///
/// Long-running tasks subscribe to a broadcast channel; the first trigger
/// records its reason and wakes every subscriber.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    reason: OnceLock<ShutdownReason>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            reason: OnceLock::new(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger shutdown. Only the first reason is kept.
    pub fn trigger(&self, reason: ShutdownReason) {
        if self.reason.set(reason).is_ok() {
            tracing::info!(?reason, "Shutdown triggered");
            let _ = self.tx.send(());
        }
    }

    pub fn reason(&self) -> Option<ShutdownReason> {
        self.reason.get().copied()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_reason_wins_and_wakes_subscribers() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();

        shutdown.trigger(ShutdownReason::StoreLost);
        shutdown.trigger(ShutdownReason::Signal);

        assert!(rx.recv().await.is_ok());
        assert_eq!(shutdown.reason(), Some(ShutdownReason::StoreLost));
        assert_eq!(shutdown.reason().map(|r| r.exit_code()), Some(1));
    }
}
