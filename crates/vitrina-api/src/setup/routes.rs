//! Route configuration and setup

use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use vitrina_core::Config;

use crate::auth::middleware::{auth_middleware, AuthState};
use crate::handlers;
use crate::state::AppState;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = Arc::new(AuthState::new(config.jwt_secret()));

    let public_routes = public_routes();

    // State is applied inside protected_routes() so the Multipart extractor
    // in the photo upload handler resolves.
    let protected_routes = protected_routes(state.clone()).layer(
        axum::middleware::from_fn_with_state(auth_state, auth_middleware),
    );

    // Chunk bodies are base64, so the JSON envelope runs ~4/3 of the raw
    // chunk; photos arrive whole as multipart.
    let body_limit = (config.max_chunk_bytes() * 2).max(config.max_photo_size_bytes() * 2);

    // Server-level concurrency limit to protect against resource exhaustion
    // under extreme load.
    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10_000)
        .max(1);

    let app = public_routes
        .merge(protected_routes)
        .nest(
            "/docs",
            utoipa_rapidoc::RapiDoc::new("/api/openapi.json")
                .path("/docs")
                .into(),
        )
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().contains(&"*".to_string()) {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(Any)
    } else {
        let origins: Result<Vec<HeaderValue>, _> =
            config.cors_origins().iter().map(|o| o.parse()).collect();

        CorsLayer::new()
            .allow_origin(origins.unwrap_or_default())
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers(Any)
    };
    Ok(cors)
}

/// Public routes (no authentication required)
fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
}

/// Protected routes (require a session JWT)
fn protected_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/upload/video/init",
            post(handlers::video_upload::init_video_upload),
        )
        .route(
            "/upload/video/chunk",
            post(handlers::video_upload::relay_video_chunk),
        )
        .route(
            "/upload/video/finalize",
            post(handlers::video_upload::finalize_video_upload),
        )
        .route("/upload/photo", post(handlers::photo_upload::upload_photo))
        .route(
            "/upload/file/{id}",
            delete(handlers::file_delete::delete_upload_file),
        )
        .route("/day-view", get(handlers::day_view::get_day_view))
        .route(
            "/day/{id}/validate",
            post(handlers::day_validation::validate_day),
        )
        .route(
            "/day/{id}/unvalidate",
            post(handlers::day_validation::unvalidate_day),
        )
        .route(
            "/upload-rules",
            put(handlers::rules::replace_upload_rules),
        )
        .with_state(state)
}
