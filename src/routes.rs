//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`    - Health check: storage, cache (public)
//! - `GET  /s/{code}`  - Short link redirect (public)
//! - `/api/*`          - REST API (caller resolved from the auth token)
//! - `/media/*`        - Uploaded images
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket (configurable for proxy deployments)
//! - **Authentication** - Bearer/Token header resolved to an actor
//! - **Path normalization** - Trailing slash handling

use std::path::PathBuf;

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_governor::key_extractor::{PeerIpKeyExtractor, SmartIpKeyExtractor};
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::services::ServeDir;

/// Routes and per-request middleware, without rate limiting.
///
/// Used as-is by the HTTP tests, which have no peer address to key on.
pub fn router(state: AppState, media_root: PathBuf) -> Router {
    let api_router = api::routes::api_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    Router::new()
        .route("/health", get(health_handler))
        .route("/s/{code}", get(redirect_handler))
        .nest("/api", api_router)
        .nest_service("/media", ServeDir::new(media_root))
        .with_state(state)
        .layer(tracing::layer())
}

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `media_root` - directory served under `/media`
/// - `behind_proxy` - when `true`, rate limiting reads client IP from
///   `X-Forwarded-For` / `X-Real-IP` headers instead of the peer socket address;
///   enable only when the service runs behind a trusted reverse proxy
pub fn app_router(state: AppState, media_root: PathBuf, behind_proxy: bool) -> NormalizePath<Router> {
    let router = router(state, media_root);

    let router = if behind_proxy {
        router.layer(rate_limit::layer(SmartIpKeyExtractor))
    } else {
        router.layer(rate_limit::layer(PeerIpKeyExtractor))
    };

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
