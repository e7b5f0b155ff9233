//! Request dispatch.
//!
//! # Responsibilities
//! - Map method + path to a content operation
//! - Keep each API version under its own path prefix
//!
//! # Design Decisions
//! - Routing is static; no runtime route configuration
//! - Unmatched paths use axum's default 404

pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::content::CapyLibrary;
use handlers::ContentState;

/// Build the full route table.
pub fn router(library: Arc<CapyLibrary>, container_id: impl Into<Arc<str>>) -> Router {
    let state = ContentState {
        library,
        container_id: container_id.into(),
    };

    Router::new()
        .route("/", get(handlers::root))
        .route("/v1", get(handlers::v1_root))
        .route("/v1/", get(handlers::v1_root))
        .route("/v1/capybaras", get(handlers::list_capybaras))
        .route("/v1/capybara", get(handlers::random_capybara))
        .route("/v1/capybara/{index}", get(handlers::capybara_by_index))
        .route("/v1/capyoftheday", get(handlers::capybara_of_the_day))
        .route("/v1/capyhour", get(handlers::capybara_of_the_hour))
        .route("/v1/capyofthehour", get(handlers::capybara_of_the_hour))
        .route("/v1/fact", get(handlers::random_fact))
        .route("/v1/facts", get(handlers::list_facts))
        .with_state(state)
}
