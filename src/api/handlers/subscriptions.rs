//! Handlers for following authors.

use axum::{
    Extension, Json,
    extract::{Path, Query, RawQuery, State},
    http::StatusCode,
};
use serde_json::json;

use crate::api::dto::pagination::Page;
use crate::api::dto::subscription::{
    RecipesLimitParams, SubscriptionListParams, SubscriptionResponse,
};
use crate::domain::permissions::Actor;
use crate::error::AppError;
use crate::state::AppState;

/// Lists the authors the caller follows, each with a recipe preview.
///
/// # Endpoint
///
/// `GET /api/users/subscriptions?limit=6&offset=0&recipes_limit=3`
///
/// `limit` and `recipes_limit` default to the configured page size and are
/// capped at the maximum.
pub async fn list_subscriptions_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<SubscriptionListParams>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Page<SubscriptionResponse>>, AppError> {
    actor.require_user()?;

    let limit = params.limit.unwrap_or(state.pagination.page_size);
    let offset = params.offset.unwrap_or(0);
    if limit < 1 || offset < 0 {
        return Err(AppError::bad_request(
            "Invalid pagination",
            json!({ "limit": limit, "offset": offset }),
        ));
    }
    let limit = limit.min(state.pagination.max_page_size);
    if offset.checked_add(limit).is_none() {
        return Err(AppError::bad_request(
            "Invalid pagination",
            json!({ "offset": ["Offset is out of range"] }),
        ));
    }
    let recipes_limit = preview_limit(&state, params.recipes_limit)?;

    let (views, count) = state
        .subscription_service
        .list(&actor, offset, limit, Some(recipes_limit))
        .await?;

    let results = views
        .into_iter()
        .map(|view| SubscriptionResponse::new(view, state.media.as_ref()))
        .collect();

    Ok(Json(Page::with_offset(
        results,
        count,
        offset,
        limit,
        &state.public_base_url,
        "/api/users/subscriptions",
        raw.as_deref(),
    )))
}

/// Recipe preview size: the configured page size unless the caller asks for one.
fn preview_limit(state: &AppState, requested: Option<i64>) -> Result<i64, AppError> {
    match requested {
        None => Ok(state.pagination.page_size),
        Some(limit) if limit < 0 => Err(AppError::bad_request(
            "Invalid recipes limit",
            json!({ "recipes_limit": ["Must be 0 or greater"] }),
        )),
        Some(limit) => Ok(limit.min(state.pagination.max_page_size)),
    }
}

/// Follows an author.
///
/// # Endpoint
///
/// `POST /api/users/{id}/subscribe?recipes_limit=3`
///
/// Without `recipes_limit` the preview holds one page of recipes.
///
/// # Errors
///
/// - 401 Unauthorized for anonymous callers
/// - 404 Not Found if the author does not exist
/// - 400 Bad Request for self-subscription or an existing subscription
pub async fn subscribe_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Query(params): Query<RecipesLimitParams>,
) -> Result<(StatusCode, Json<SubscriptionResponse>), AppError> {
    let recipes_limit = preview_limit(&state, params.recipes_limit)?;
    let view = state
        .subscription_service
        .subscribe(&actor, id, Some(recipes_limit))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubscriptionResponse::new(view, state.media.as_ref())),
    ))
}

/// Unfollows an author.
///
/// # Endpoint
///
/// `DELETE /api/users/{id}/subscribe`
pub async fn unsubscribe_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.subscription_service.unsubscribe(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
