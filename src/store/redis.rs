//! Redis-backed counter store.
//!
//! Uses a `ConnectionManager`, which multiplexes one connection across all
//! callers and reconnects on its own after a dropped connection.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::{CounterStore, StoreError};
use crate::config::StoreConfig;

pub struct RedisStore {
    conn: ConnectionManager,
    command_timeout: Duration,
}

impl RedisStore {
    /// Connect to the configured server. Fails if the first connection
    /// cannot be established within the command timeout.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let command_timeout = Duration::from_millis(config.command_timeout_ms);
        let client = redis::Client::open(connection_url(config).as_str())?;

        tracing::info!(
            target_addr = %redacted_url(config),
            tls = config.tls,
            insecure_skip_verify = config.insecure_skip_verify,
            "Connecting to redis"
        );

        let conn = with_timeout(command_timeout, ConnectionManager::new(client)).await?;

        Ok(Self {
            conn,
            command_timeout,
        })
    }
}

async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(StoreError::from),
        Err(_) => Err(StoreError::Timeout),
    }
}

#[async_trait]
impl CounterStore for RedisStore {
    async fn increment(&self, key: &str) -> Result<i64, StoreError> {
        let mut conn = self.conn.clone();
        with_timeout(self.command_timeout, conn.incr(key, 1_i64)).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let pong: String =
            with_timeout(self.command_timeout, redis::cmd("PING").query_async(&mut conn)).await?;

        if pong.eq_ignore_ascii_case("PONG") {
            Ok(())
        } else {
            Err(StoreError::Unavailable(format!("unexpected PING reply: {}", pong)))
        }
    }

    fn kind(&self) -> &'static str {
        "redis"
    }
}

/// Build the connection URL. A configured address that already carries a
/// scheme is used verbatim.
pub fn connection_url(config: &StoreConfig) -> String {
    build_url(config, false)
}

/// Same as [`connection_url`] with the password masked, for logs.
pub fn redacted_url(config: &StoreConfig) -> String {
    build_url(config, true)
}

fn build_url(config: &StoreConfig, redact: bool) -> String {
    let address = config.address.trim();
    if address.contains("://") {
        return if redact {
            mask_url_password(address)
        } else {
            address.to_string()
        };
    }

    let scheme = if config.tls { "rediss" } else { "redis" };
    let user = config
        .username
        .as_deref()
        .map(|u| urlencoding::encode(u).into_owned())
        .unwrap_or_default();
    let auth = match config.password.as_deref() {
        Some(_) if redact => format!("{}:***@", user),
        Some(password) => format!("{}:{}@", user, urlencoding::encode(password)),
        None if !user.is_empty() => format!("{}@", user),
        None => String::new(),
    };
    let fragment = if config.tls && config.insecure_skip_verify {
        "#insecure"
    } else {
        ""
    };

    format!("{}://{}{}/{}{}", scheme, auth, address, config.db, fragment)
}

fn mask_url_password(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((auth, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    match auth.split_once(':') {
        Some((user, _)) => format!("{}://{}:***@{}", scheme, user, host),
        None => url.to_string(),
    }
}
