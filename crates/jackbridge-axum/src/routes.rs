//! Route definitions and router construction.
//!
//! This module defines the HTTP routes and creates the main router.
//! Handlers delegate to the runtime services in the shared context.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use crate::bootstrap::{AxumContext, CorsConfig};
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

/// Build all API routes without `/api` prefix (for nesting under /api).
///
/// Returns a router typed as `Router<AppState>` WITHOUT `.with_state()`
/// applied; the caller applies it before nesting.
pub(crate) fn api_routes() -> Router<AppState> {
    Router::new()
        // Control API
        .route("/control/started", get(handlers::control::started))
        .route("/control/status", get(handlers::control::status))
        .route("/control/start", post(handlers::control::start))
        .route("/control/stop", post(handlers::control::stop))
        .route(
            "/control/switch-master",
            post(handlers::control::switch_master),
        )
        // Configure API
        .route(
            "/configure/{group}/{name}",
            get(handlers::configure::get)
                .put(handlers::configure::set)
                .delete(handlers::configure::reset),
        )
        .route(
            "/configure/{group}/{name}/constraint",
            get(handlers::configure::constraint),
        )
        // Notifications
        .route("/events", get(handlers::events::stream))
}

/// Create the main Axum router with all API routes.
///
/// # Path Parameter Syntax
/// Axum 0.8 uses brace syntax for path parameters: `{group}`, `{name}`
pub fn create_router(ctx: AxumContext, cors_config: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer(cors_config);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes().with_state(state).layer(cors))
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
