//! Handlers for registration, profiles, passwords and avatars.

use axum::{
    Extension, Json,
    extract::{Path, Query, RawQuery, State},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::pagination::{Page, PageParams};
use crate::api::dto::user::{
    AvatarRequest, AvatarResponse, CreatedUserResponse, RegisterRequest, SetPasswordRequest,
    UserResponse,
};
use crate::application::services::RegisterUser;
use crate::domain::permissions::Actor;
use crate::error::AppError;
use crate::state::AppState;

/// Lists users, paginated.
///
/// # Endpoint
///
/// `GET /api/users?page=1&limit=6`
pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<PageParams>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Page<UserResponse>>, AppError> {
    let request = params.resolve(&state.pagination)?;

    let (users, count) = state
        .user_service
        .list(request.offset(), request.limit)
        .await?;
    let profiles = state.user_service.profiles(&actor, users).await?;

    let results = profiles
        .into_iter()
        .map(|profile| UserResponse::new(profile, state.media.as_ref()))
        .collect();

    Ok(Json(Page::new(
        results,
        count,
        request,
        &state.public_base_url,
        "/api/users",
        raw.as_deref(),
    )))
}

/// Registers a new account.
///
/// # Endpoint
///
/// `POST /api/users`
///
/// # Request Body
///
/// ```json
/// {
///   "email": "cook@example.com",
///   "username": "cook",
///   "first_name": "Ann",
///   "last_name": "Smith",
///   "password": "long-enough"
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request for invalid fields or a taken email/username.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<CreatedUserResponse>), AppError> {
    payload.validate()?;

    let user = state
        .user_service
        .register(RegisterUser {
            email: payload.email,
            username: payload.username,
            first_name: payload.first_name,
            last_name: payload.last_name,
            password: payload.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// `GET /api/users/me`
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<UserResponse>, AppError> {
    let user = actor.require_user()?.clone();
    let profile = state.user_service.profile(&actor, user).await?;

    Ok(Json(UserResponse::new(profile, state.media.as_ref())))
}

/// `GET /api/users/{id}`
pub async fn get_user_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.user_service.get(id).await?;
    let profile = state.user_service.profile(&actor, user).await?;

    Ok(Json(UserResponse::new(profile, state.media.as_ref())))
}

/// Changes the caller's password.
///
/// # Endpoint
///
/// `POST /api/users/set_password`
///
/// # Errors
///
/// - 401 Unauthorized for anonymous callers
/// - 400 Bad Request if `current_password` is wrong or `new_password` is invalid
pub async fn set_password_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<SetPasswordRequest>,
) -> Result<StatusCode, AppError> {
    actor.require_user()?;
    payload.validate()?;

    state
        .user_service
        .set_password(&actor, &payload.current_password, &payload.new_password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Uploads a new avatar as a base64 data-URI.
///
/// # Endpoint
///
/// `PUT /api/users/me/avatar`
///
/// # Response
///
/// ```json
/// { "avatar": "http://localhost:3000/media/users/avatars/<uuid>.png" }
/// ```
pub async fn set_avatar_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<AvatarRequest>,
) -> Result<Json<AvatarResponse>, AppError> {
    actor.require_user()?;

    let data = payload
        .avatar
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| {
            AppError::bad_request(
                "Validation failed",
                json!({ "avatar": ["This field is required"] }),
            )
        })?;

    let user = state.user_service.set_avatar(&actor, &data).await?;
    let path = user.avatar.ok_or_else(|| {
        AppError::internal("Avatar was not stored", json!({ "user_id": user.id }))
    })?;

    Ok(Json(AvatarResponse {
        avatar: state.media.url(&path),
    }))
}

/// `DELETE /api/users/me/avatar`
pub async fn delete_avatar_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<StatusCode, AppError> {
    state.user_service.delete_avatar(&actor).await?;
    Ok(StatusCode::NO_CONTENT)
}
