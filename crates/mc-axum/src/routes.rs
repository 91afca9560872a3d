//! Route definitions and router construction.
//!
//! API routes live under `/api`; `/health` sits at the root. Static serving
//! is layered on by [`create_app`].

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

use crate::bootstrap::{AxumContext, CorsConfig, ServerConfig};
use crate::handlers;
use crate::state::AppState;

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            use axum::http::HeaderValue;
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// API routes without the `/api` prefix, state not yet applied.
pub(crate) fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(handlers::chat::relay))
        .route("/status", get(handlers::status::get))
        .route("/sessions", get(handlers::sessions::list))
        .route("/cron", get(handlers::cron::list))
        // Panels
        .route("/tasks", get(handlers::panels::tasks))
        .route("/costs", get(handlers::panels::costs))
        .route("/scout", get(handlers::panels::scout))
        .route("/agents", get(handlers::panels::agents))
        // Keep unknown API paths out of the SPA fallback
        .fallback(api_not_found)
}

/// Create the API router: `/health` plus everything under `/api`.
pub fn create_router(ctx: AxumContext, cors_config: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer(cors_config);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes().with_state(state).layer(cors))
}

/// Create a router with API routes and static asset serving.
///
/// Files under `static_dir` are served as-is; any other non-API path falls
/// back to `index.html` for client-side routing.
pub fn create_spa_router<P: AsRef<Path>>(
    ctx: AxumContext,
    static_dir: P,
    cors_config: &CorsConfig,
) -> Router {
    let static_path = static_dir.as_ref();
    let index_path = static_path.join("index.html");

    let serve_dir = ServeDir::new(static_path).fallback(ServeFile::new(&index_path));

    // API routes take priority; unknown `/api` paths still 404
    create_router(ctx, cors_config).fallback_service(serve_dir)
}

/// Full application router for a server configuration.
pub fn create_app(ctx: AxumContext, config: &ServerConfig) -> Router {
    let router = match &config.static_dir {
        Some(dir) => create_spa_router(ctx, dir, &config.cors),
        None => create_router(ctx, &config.cors),
    };
    match &config.public_dir {
        Some(dir) => router.nest_service("/public", ServeDir::new(dir)),
        None => router,
    }
}

async fn api_not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Health check endpoint.
pub(crate) async fn health_check() -> &'static str {
    "OK"
}
