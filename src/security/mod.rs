//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → trusted_proxy.rs (resolve caller address, attach ClientIp)
//!     → cors.rs (origin/method policy, answer preflights)
//!     → rate_limit.rs (fixed-window quota per ClientIp)
//!     → Pass to visit accounting and routing
//! ```
//!
//! # Design Decisions
//! - No trust in client input: forwarded headers need a trusted peer
//! - Rejections happen before any store or content work

pub mod cors;
pub mod rate_limit;
pub mod trusted_proxy;

pub use rate_limit::{RateDecision, RateLimiter};
pub use trusted_proxy::{ClientIp, TrustedProxies};
