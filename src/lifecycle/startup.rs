//! Startup orchestration.
//!
//! # Responsibilities
//! - Pick and connect the backing store
//!
//! # Design Decisions
//! - Fail fast: a configured store that cannot be reached aborts startup
//! - No configured address means the in-process store

use std::sync::Arc;

use crate::config::StoreConfig;
use crate::store::{CounterStore, MemoryStore, RedisStore, StoreError};

pub async fn connect_store(config: &StoreConfig) -> Result<Arc<dyn CounterStore>, StoreError> {
    if config.address.trim().is_empty() {
        tracing::warn!("No store address configured, visits are counted in memory only");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = RedisStore::connect(config).await?;
    tracing::info!("Store connected");
    Ok(Arc::new(store))
}
