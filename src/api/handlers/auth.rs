//! Handlers for token login and logout.

use axum::{Extension, Json, extract::State, http::StatusCode};
use serde_json::json;
use validator::Validate;

use crate::api::dto::auth::{LoginRequest, TokenResponse};
use crate::api::middleware::auth::PresentedToken;
use crate::domain::permissions::Actor;
use crate::error::AppError;
use crate::state::AppState;

/// Exchanges credentials for a new auth token.
///
/// # Endpoint
///
/// `POST /api/auth/token/login`
///
/// # Request Body
///
/// ```json
/// { "email": "cook@example.com", "password": "secret" }
/// ```
///
/// # Response
///
/// ```json
/// { "auth_token": "k3J9..." }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request for malformed input or wrong credentials.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    payload.validate()?;

    let auth_token = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(TokenResponse { auth_token }))
}

/// Revokes the token used for this request.
///
/// # Endpoint
///
/// `POST /api/auth/token/logout`
///
/// # Errors
///
/// Returns 401 Unauthorized for anonymous callers.
pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Extension(PresentedToken(token)): Extension<PresentedToken>,
) -> Result<StatusCode, AppError> {
    actor.require_user()?;
    let token = token.ok_or_else(|| {
        AppError::unauthorized("Unauthorized", json!({"reason": "No token presented"}))
    })?;

    state.auth_service.logout(&token).await?;

    Ok(StatusCode::NO_CONTENT)
}
