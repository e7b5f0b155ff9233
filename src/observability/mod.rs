//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (subscriber setup, panic hook)
//!     → access_log.rs (one structured record per request)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//! ```
//!
//! # Design Decisions
//! - Structured fields, never pre-formatted strings
//! - Request ID flows into the access record and the response header

pub mod access_log;
pub mod logging;

pub use access_log::{AccessLogger, X_REQUEST_ID};
