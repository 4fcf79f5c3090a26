//! Handler for the shopping list download.

use axum::{
    Extension,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::domain::permissions::Actor;
use crate::domain::shopping_list::SHOPPING_LIST_FILENAME;
use crate::error::AppError;
use crate::state::AppState;

/// Downloads the caller's aggregated shopping list as a text attachment.
///
/// # Endpoint
///
/// `GET /api/recipes/download_shopping_cart`
///
/// # Response
///
/// ```text
/// Список покупок:
///
/// Salt: 15g
/// ```
///
/// # Errors
///
/// Returns 401 Unauthorized for anonymous callers.
pub async fn download_shopping_cart_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Response, AppError> {
    let body = state.shopping_list_service.export(&actor).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{SHOPPING_LIST_FILENAME}\""),
            ),
        ],
        body,
    )
        .into_response())
}
