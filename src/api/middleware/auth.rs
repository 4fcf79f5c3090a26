//! Token authentication middleware.
//!
//! Every API request gets an [`Actor`] extension. Requests without an
//! `Authorization` header run as [`Actor::Anonymous`]; handlers decide whether
//! that is enough.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use serde_json::json;

use crate::domain::permissions::Actor;
use crate::{error::AppError, state::AppState};

/// Raw token presented with the current request, if any.
#[derive(Debug, Clone, Default)]
pub struct PresentedToken(pub Option<String>);

/// Legacy `Authorization: Token <token>` scheme.
const TOKEN_SCHEME: &str = "Token ";

/// Resolves the caller from the `Authorization` header.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// Authorization: Token <token>
/// ```
///
/// # Errors
///
/// Returns `401 Unauthorized` if the header is present but malformed, or the
/// token is unknown or revoked. A missing header is not an error.
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let token = match token_scheme(&parts.headers) {
        TokenHeader::Missing => None,
        TokenHeader::Token(token) => Some(token),
        TokenHeader::Other => {
            let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
                .await
                .map_err(|_| {
                    AppError::unauthorized(
                        "Unauthorized",
                        json!({"reason": "Authorization header is invalid"}),
                    )
                })?;
            Some(token)
        }
    };

    let actor = match &token {
        Some(token) => Actor::User(st.auth_service.authenticate(token).await?),
        None => Actor::Anonymous,
    };

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(actor);
    req.extensions_mut().insert(PresentedToken(token));

    Ok(next.run(req).await)
}

enum TokenHeader {
    Missing,
    Token(String),
    Other,
}

fn token_scheme(headers: &HeaderMap) -> TokenHeader {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return TokenHeader::Missing;
    };

    match value.to_str() {
        Ok(value) if value.starts_with(TOKEN_SCHEME) => {
            TokenHeader::Token(value[TOKEN_SCHEME.len()..].trim().to_string())
        }
        _ => TokenHeader::Other,
    }
}
