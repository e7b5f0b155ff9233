//! Backing store subsystem.
//!
//! # Responsibilities
//! - Hold the single persisted visit counter
//! - Answer liveness probes
//!
//! # Design Decisions
//! - One trait at the seam so the pipeline and the liveness monitor can be
//!   driven by a fake store in tests
//! - Implementations must be safe for arbitrarily many concurrent callers

pub mod memory;
pub mod redis;

use async_trait::async_trait;
use thiserror::Error;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store command timed out")]
    Timeout,
}

/// Shared counter store.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically add one to `key`, returning the new value.
    async fn increment(&self, key: &str) -> Result<i64, StoreError>;

    /// Check that the connection is alive.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Short name for logs.
    fn kind(&self) -> &'static str;
}
