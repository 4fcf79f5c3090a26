//! Handlers for recipe short links.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::api::dto::recipe::ShortLinkResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the recipe's short link, creating it on first request.
///
/// # Endpoint
///
/// `GET /api/recipes/{id}/get-link`
///
/// # Response
///
/// ```json
/// { "short-link": "http://localhost:3000/s/3f2a9c1b" }
/// ```
pub async fn get_link_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ShortLinkResponse>, AppError> {
    let link = state.short_link_service.get_or_create(id).await?;

    Ok(Json(ShortLinkResponse {
        short_link: state.short_link_service.short_url(&link.short_code),
    }))
}

/// Redirects a short code to the recipe page.
///
/// # Endpoint
///
/// `GET /s/{code}`
///
/// # Response Codes
///
/// - **302 Found**: `Location` points at `{FRONTEND_BASE_URL}/recipes/{id}`
/// - **404 Not Found**: unknown code
pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Response, AppError> {
    let recipe_id = state.short_link_service.resolve(&code).await?;
    let location = state.short_link_service.redirect_url(recipe_id);

    tracing::debug!(code = %code, recipe_id, "Short link redirect");

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
