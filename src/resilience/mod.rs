//! Resilience patterns.
//!
//! # Components
//! - `panic.rs`: per-request fault containment
//!
//! # Design Decisions
//! - One request's fault never affects another's
//! - The client sees a fixed message; details go to the operator log

pub mod panic;

pub use panic::catch_panic_layer;
