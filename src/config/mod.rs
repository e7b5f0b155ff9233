//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → optional TOML file (loader.rs)
//!     → environment overrides (REDIS, PORT, TRUSTED_PROXIES, ...)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared by value/Arc with all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so an empty environment still boots
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AppConfig, ContentConfig, CorsConfig, ListenerConfig, LivenessConfig, LoggingConfig,
    ProxyConfig, RateLimitConfig, StoreConfig,
};
