//! Handlers for recipes, favorites and the shopping cart.

use axum::{
    Extension, Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use serde_json::json;

use crate::api::dto::pagination::Page;
use crate::api::dto::recipe::{
    RecipeRequest, RecipeResponse, RecipeSummaryResponse, parse_recipe_query,
};
use crate::api::dto::user::UserResponse;
use crate::application::services::RecipeDetails;
use crate::domain::entities::RecipeCollection;
use crate::domain::permissions::Actor;
use crate::error::AppError;
use crate::state::AppState;

/// Builds read representations, loading every author once.
async fn to_responses(
    state: &AppState,
    actor: &Actor,
    details: Vec<RecipeDetails>,
) -> Result<Vec<RecipeResponse>, AppError> {
    let author_ids: Vec<i64> = details.iter().map(|d| d.recipe.author_id).collect();
    let authors = state
        .user_service
        .profiles_by_id(actor, &author_ids)
        .await?;

    details
        .into_iter()
        .map(|detail| {
            let author_id = detail.recipe.author_id;
            let author = authors
                .get(&author_id)
                .cloned()
                .ok_or_else(|| {
                    AppError::internal("Recipe author not found", json!({ "author_id": author_id }))
                })?;
            Ok(RecipeResponse::new(
                detail,
                UserResponse::new(author, state.media.as_ref()),
                state.media.as_ref(),
            ))
        })
        .collect()
}

async fn to_response(
    state: &AppState,
    actor: &Actor,
    details: RecipeDetails,
) -> Result<RecipeResponse, AppError> {
    let id = details.recipe.id;
    to_responses(state, actor, vec![details])
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("Recipe not found", json!({ "id": id })))
}

/// Lists recipes, newest first.
///
/// # Endpoint
///
/// `GET /api/recipes`
///
/// # Query Parameters
///
/// - `page`, `limit` - page-number pagination
/// - `name` - case-insensitive substring
/// - `tags` - tag slug, repeatable (any match)
/// - `author` - author id
/// - `is_favorited`, `is_in_shopping_cart` - `0` or `1`, relative to the caller
pub async fn list_recipes_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Page<RecipeResponse>>, AppError> {
    let (page_params, query) = parse_recipe_query(raw.as_deref())?;
    let request = page_params.resolve(&state.pagination)?;

    let page = state
        .recipe_service
        .list(&actor, query, request.offset(), request.limit)
        .await?;
    let results = to_responses(&state, &actor, page.recipes).await?;

    Ok(Json(Page::new(
        results,
        page.count,
        request,
        &state.public_base_url,
        "/api/recipes",
        raw.as_deref(),
    )))
}

/// Creates a recipe authored by the caller.
///
/// # Endpoint
///
/// `POST /api/recipes`
///
/// # Request Body
///
/// ```json
/// {
///   "ingredients": [{ "id": 1, "amount": 10 }],
///   "tags": [1, 2],
///   "image": "data:image/png;base64,iVBORw0KGgo...",
///   "name": "Pancakes",
///   "text": "Mix and fry",
///   "cooking_time": 20
/// }
/// ```
///
/// # Errors
///
/// - 401 Unauthorized for anonymous callers
/// - 400 Bad Request with per-field messages for invalid payloads
pub async fn create_recipe_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<RecipeRequest>,
) -> Result<(StatusCode, Json<RecipeResponse>), AppError> {
    let details = state.recipe_service.create(&actor, payload.into()).await?;
    let response = to_response(&state, &actor, details).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /api/recipes/{id}`
pub async fn get_recipe_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<Json<RecipeResponse>, AppError> {
    let details = state.recipe_service.get(&actor, id).await?;
    Ok(Json(to_response(&state, &actor, details).await?))
}

/// Replaces a recipe. Tags and ingredients are replaced as whole sets; a
/// missing `image` keeps the stored one.
///
/// # Endpoint
///
/// `PATCH /api/recipes/{id}`
///
/// # Errors
///
/// - 401 Unauthorized / 403 Forbidden if the caller is not the author or staff
/// - 404 Not Found for unknown recipes
pub async fn update_recipe_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(payload): Json<RecipeRequest>,
) -> Result<Json<RecipeResponse>, AppError> {
    let details = state
        .recipe_service
        .update(&actor, id, payload.into())
        .await?;
    Ok(Json(to_response(&state, &actor, details).await?))
}

/// Deletes a recipe and drops its cached short link.
///
/// # Endpoint
///
/// `DELETE /api/recipes/{id}`
pub async fn delete_recipe_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let link = state.short_link_service.find_for_recipe(id).await?;

    state.recipe_service.delete(&actor, id).await?;

    if let Some(link) = link {
        state.short_link_service.invalidate(&link.short_code).await;
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn add_to(
    state: &AppState,
    actor: &Actor,
    collection: RecipeCollection,
    id: i64,
) -> Result<(StatusCode, Json<RecipeSummaryResponse>), AppError> {
    let summary = state
        .recipe_service
        .add_to_collection(actor, collection, id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RecipeSummaryResponse::new(summary, state.media.as_ref())),
    ))
}

async fn remove_from(
    state: &AppState,
    actor: &Actor,
    collection: RecipeCollection,
    id: i64,
) -> Result<StatusCode, AppError> {
    state
        .recipe_service
        .remove_from_collection(actor, collection, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/recipes/{id}/favorite`
pub async fn add_favorite_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<RecipeSummaryResponse>), AppError> {
    add_to(&state, &actor, RecipeCollection::Favorites, id).await
}

/// `DELETE /api/recipes/{id}/favorite`
pub async fn remove_favorite_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    remove_from(&state, &actor, RecipeCollection::Favorites, id).await
}

/// `POST /api/recipes/{id}/shopping_cart`
pub async fn add_to_shopping_cart_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<RecipeSummaryResponse>), AppError> {
    add_to(&state, &actor, RecipeCollection::ShoppingCart, id).await
}

/// `DELETE /api/recipes/{id}/shopping_cart`
pub async fn remove_from_shopping_cart_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    remove_from(&state, &actor, RecipeCollection::ShoppingCart, id).await
}
