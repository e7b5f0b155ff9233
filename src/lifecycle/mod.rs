//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Connect store → Build server → Spawn liveness monitor
//!
//! Shutdown (shutdown.rs):
//!     Signal or store loss → Stop accepting → Drain (bounded) → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!
//! Supervision (supervisor.rs):
//!     First of signal / monitor error / server exit → ShutdownReason → Outcome
//! ```
//!
//! # Design Decisions
//! - Store loss exits non-zero so the supervisor restarts the process
//! - Drain has a deadline; forced exit after it

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod supervisor;

pub use shutdown::{Shutdown, ShutdownReason};
pub use supervisor::{supervise, Outcome, SupervisorError};
