//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind host, port).
    pub listener: ListenerConfig,

    /// Backing store connection used by the visit counter.
    pub store: StoreConfig,

    /// Store liveness probing and the fatal-loss policy.
    pub liveness: LivenessConfig,

    /// Fixed-window rate limiting.
    pub rate_limit: RateLimitConfig,

    /// Trusted intermediaries for caller identity resolution.
    pub proxy: ProxyConfig,

    /// Cross-origin policy.
    pub cors: CorsConfig,

    /// Log output settings.
    pub logging: LoggingConfig,

    /// Content library locations.
    pub content: ContentConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host to bind (e.g., "0.0.0.0").
    pub host: String,

    /// Port to listen on.
    pub port: u16,
}

impl ListenerConfig {
    /// Socket address string for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Backing store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store address, either `host:port` or a full `redis://` URL.
    /// Empty means the in-process store is used.
    pub address: String,

    /// Optional ACL username.
    pub username: Option<String>,

    /// Optional password.
    pub password: Option<String>,

    /// Connect over TLS.
    pub tls: bool,

    /// Connect over TLS without verifying the server certificate.
    pub insecure_skip_verify: bool,

    /// Logical database index.
    pub db: i64,

    /// Key holding the total visit count.
    pub visits_key: String,

    /// Timeout for a single store command in milliseconds.
    pub command_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            username: None,
            password: None,
            tls: false,
            insecure_skip_verify: false,
            db: 0,
            visits_key: "visits".to_string(),
            command_timeout_ms: 2000,
        }
    }
}

/// Liveness monitor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LivenessConfig {
    /// Probe interval in seconds.
    pub interval_secs: u64,

    /// Probe timeout in seconds.
    pub probe_timeout_secs: u64,

    /// Consecutive failed probes before the store is declared lost.
    pub failure_threshold: u32,

    /// Time allowed for in-flight requests to finish once the store is lost.
    /// Zero exits immediately.
    pub drain_timeout_secs: u64,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            probe_timeout_secs: 5,
            failure_threshold: 1,
            drain_timeout_secs: 5,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Maximum requests admitted per caller per window.
    pub max_requests: u32,

    /// Window length in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 500,
            window_secs: 30,
        }
    }
}

/// Trusted proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// CIDR ranges (or bare addresses) whose forwarded header is honored.
    pub trusted_ranges: Vec<String>,

    /// Header carrying the original client address.
    pub forwarded_header: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            trusted_ranges: vec!["10.50.0.0/24".to_string()],
            forwarded_header: "X-Forwarded-For".to_string(),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins; `*` allows any origin.
    pub allow_origins: Vec<String>,

    /// Allowed methods.
    pub allow_methods: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: vec!["*".to_string()],
            allow_methods: vec!["GET".to_string()],
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    pub json: bool,

    /// Log a backtrace alongside recovered panics.
    pub stack_trace: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            stack_trace: true,
        }
    }
}

/// Content library configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Directory containing the image files.
    pub images_dir: String,

    /// JSON file mapping image index to alt text.
    pub alt_text_path: String,

    /// Public base URL used when building image links.
    pub public_url: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            images_dir: "capys".to_string(),
            alt_text_path: "utils/alt.json".to_string(),
            public_url: "http://localhost:3000".to_string(),
        }
    }
}
