//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, connect info, graceful shutdown)
//!     → middleware/ (ordered request pipeline)
//!     → routing (content handlers)
//!     → response.rs (JSON envelope)
//!     → Send to client
//! ```

pub mod middleware;
pub mod response;
pub mod server;

pub use middleware::{Pipeline, Stage, STAGES};
pub use response::{ApiError, ApiResponse};
pub use server::HttpServer;
