//! Content endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;

use crate::content::{CapyImage, CapyLibrary, Page};
use crate::http::response::{ApiError, ApiResponse};

/// Shared state for content routes.
#[derive(Clone)]
pub struct ContentState {
    pub library: Arc<CapyLibrary>,
    pub container_id: Arc<str>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub from: Option<usize>,
    pub take: Option<usize>,
}

impl PageQuery {
    fn page(&self) -> Page {
        Page::new(self.from, self.take)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ImageQuery {
    #[serde(default)]
    pub json: bool,
}

pub async fn root(State(state): State<ContentState>) -> ApiResponse {
    ApiResponse::ok(format!("ok you pull up ({})", state.container_id))
}

pub async fn v1_root(State(state): State<ContentState>) -> ApiResponse {
    ApiResponse::ok(format!("welcome to v1 of capybara heaven ({})", state.container_id))
}

pub async fn list_capybaras(
    State(state): State<ContentState>,
    Query(query): Query<PageQuery>,
) -> ApiResponse<Vec<CapyImage>> {
    ApiResponse::with_data("ok", state.library.page(query.page()))
}

pub async fn random_capybara(
    State(state): State<ContentState>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, ApiError> {
    let image = state
        .library
        .random()
        .ok_or_else(|| ApiError::not_found("No capybaras available"))?;
    image_response(&state.library, image, query.json).await
}

pub async fn capybara_by_index(
    State(state): State<ContentState>,
    Path(index): Path<String>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, ApiError> {
    let index: usize = index
        .parse()
        .map_err(|_| ApiError::bad_request("Index must be a positive number"))?;
    let image = state
        .library
        .get(index)
        .ok_or_else(|| ApiError::not_found("Capybara not found"))?;
    image_response(&state.library, image, query.json).await
}

pub async fn capybara_of_the_day(
    State(state): State<ContentState>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, ApiError> {
    let image = state
        .library
        .of_the_day(Utc::now().date_naive())
        .ok_or_else(|| ApiError::not_found("No capybaras available"))?;
    image_response(&state.library, image, query.json).await
}

pub async fn capybara_of_the_hour(
    State(state): State<ContentState>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, ApiError> {
    let image = state
        .library
        .of_the_hour(Utc::now())
        .ok_or_else(|| ApiError::not_found("No capybaras available"))?;
    image_response(&state.library, image, query.json).await
}

pub async fn random_fact(State(state): State<ContentState>) -> Result<ApiResponse<String>, ApiError> {
    state
        .library
        .random_fact()
        .map(|fact| ApiResponse::with_data("ok", fact.to_string()))
        .ok_or_else(|| ApiError::not_found("No facts available"))
}

pub async fn list_facts(
    State(state): State<ContentState>,
    Query(query): Query<PageQuery>,
) -> ApiResponse<Vec<String>> {
    ApiResponse::with_data("ok", state.library.facts(query.page()).to_vec())
}

async fn image_response(
    library: &CapyLibrary,
    image: CapyImage,
    as_json: bool,
) -> Result<Response, ApiError> {
    if as_json {
        return Ok(ApiResponse::with_data("ok", image).into_response());
    }

    match library.read_image(&image).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, image.content_type())], bytes).into_response()),
        Err(e) => {
            tracing::error!(index = image.index, path = ?image.path, error = %e, "Failed to read image");
            Err(ApiError::internal())
        }
    }
}
