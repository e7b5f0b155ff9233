//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Liveness monitor (liveness.rs):
//!     Periodic timer
//!     → PING the shared store
//!     → success: reset failure count, debug heartbeat
//!     → failure: count; at threshold return LivenessError::StoreLost
//!
//! lifecycle/supervisor.rs:
//!     LivenessError → trigger shutdown → bounded drain → exit(1)
//! ```
//!
//! # Design Decisions
//! - The monitor never exits the process itself; it returns the fatal signal
//! - Threshold defaults to 1, matching the fail-fast deployment policy
//! - Visit-counter failures do not feed the probe failure count

pub mod liveness;

pub use liveness::{LivenessError, LivenessMonitor, LivenessState};
