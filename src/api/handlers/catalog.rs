//! Handlers for tags and ingredients. Reference data is not paginated.

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::api::dto::catalog::{IngredientResponse, IngredientSearchParams, TagResponse};
use crate::error::AppError;
use crate::state::AppState;

/// `GET /api/tags`
pub async fn list_tags_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<TagResponse>>, AppError> {
    let tags = state.catalog_service.list_tags().await?;
    Ok(Json(tags.into_iter().map(Into::into).collect()))
}

/// `GET /api/tags/{id}`
pub async fn get_tag_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TagResponse>, AppError> {
    let tag = state.catalog_service.get_tag(id).await?;
    Ok(Json(tag.into()))
}

/// Searches ingredients by name.
///
/// # Endpoint
///
/// `GET /api/ingredients?name=<query>`
///
/// Names starting with the query come first, then names containing it.
pub async fn list_ingredients_handler(
    State(state): State<AppState>,
    Query(params): Query<IngredientSearchParams>,
) -> Result<Json<Vec<IngredientResponse>>, AppError> {
    let ingredients = state
        .catalog_service
        .search_ingredients(params.name.as_deref())
        .await?;
    Ok(Json(ingredients.into_iter().map(Into::into).collect()))
}

/// `GET /api/ingredients/{id}`
pub async fn get_ingredient_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<IngredientResponse>, AppError> {
    let ingredient = state.catalog_service.get_ingredient(id).await?;
    Ok(Json(ingredient.into()))
}
