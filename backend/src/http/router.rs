//! Router configuration for the HTTP server.
//!
//! This module sets up all routes, the media file service and middleware
//! (cookies, CORS, compression, tracing), and creates the axum router ready
//! for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_cookies::CookieManagerLayer;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;
use crate::routes::artworks::{
    ARTWORK_GEOFENCE_CHECK_PATH, ARTWORK_TRANSLATIONS_PATH, ARTWORK_UPLOAD_PATH,
};
use crate::routes::auth::{LOGIN_PATH, LOGOUT_PATH, REGISTER_PATH};
use crate::routes::dashboard::DASHBOARD_PATH;
use crate::routes::landing::INDEX_PATH;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let media = ServeDir::new(state.media.root());
    let media_prefix = state.media.url_prefix().trim_end_matches('/').to_string();
    let body_limit = state.config.media.max_upload_bytes;

    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .route(INDEX_PATH, get(handlers::index))
        // Accounts
        .route(REGISTER_PATH, get(handlers::register_page).post(handlers::register))
        .route(LOGIN_PATH, get(handlers::login_page).post(handlers::login))
        .route(LOGOUT_PATH, get(handlers::logout).post(handlers::logout))
        // Staff pages
        .route(DASHBOARD_PATH, get(handlers::dashboard))
        .route(ARTWORK_UPLOAD_PATH, get(handlers::upload_page).post(handlers::upload))
        .route(
            ARTWORK_TRANSLATIONS_PATH,
            get(handlers::translations_page).post(handlers::add_translation),
        )
        .route(ARTWORK_GEOFENCE_CHECK_PATH, post(handlers::geofence_check));

    // Nesting at the root is not allowed, so a bare "/" prefix serves media
    // as the fallback instead.
    let router = if media_prefix.is_empty() {
        router.fallback_service(media)
    } else {
        router.nest_service(&media_prefix, media)
    };

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CookieManagerLayer::new())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::db::LocalRepository;
    use std::sync::Arc;

    #[test]
    fn test_router_creation() {
        let state = AppState::new(Arc::new(LocalRepository::new()), AppConfig::default());
        let _router = create_router(state);
    }

    #[test]
    fn test_router_with_root_media_prefix() {
        let mut config = AppConfig::default();
        config.media.url = "/".to_string();
        let state = AppState::new(Arc::new(LocalRepository::new()), config);
        let _router = create_router(state);
    }
}
