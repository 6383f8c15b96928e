use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::middleware::{auth_middleware, metrics_middleware};
use super::{admin, catalog, handlers};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Admin routes, behind the configured authenticator
    let admin_routes = Router::new()
        .route("/admin/index", post(admin::start_index))
        .route("/admin/index/cancel", post(admin::cancel_index))
        .route("/admin/index/offset", put(admin::set_offset))
        .route("/admin/index/status", get(admin::get_status))
        .route("/admin/catalog/{category}", delete(admin::clear_catalog))
        .route(
            "/admin/requests",
            get(admin::list_requests).delete(admin::clear_requests),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Catalog (read-only)
        .route("/catalog/{category}", get(catalog::list_catalog))
        .merge(admin_routes)
        .with_state(state.clone());

    Router::new()
        .route("/", get(handlers::root))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
