use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::catalog::handlers;
use crate::features::catalog::services::CatalogService;

/// Create routes for the catalog feature
///
/// Reads require authentication; mutations are guarded admin-only in the
/// handlers.
pub fn routes(service: Arc<CatalogService>) -> Router {
    Router::new()
        .route(
            "/api/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/api/categories/{id}",
            put(handlers::update_category).delete(handlers::delete_category),
        )
        .route(
            "/api/categories/{id}/services",
            get(handlers::list_services).post(handlers::create_service),
        )
        .route(
            "/api/categories/{id}/services/search",
            get(handlers::search_services),
        )
        .route(
            "/api/categories/{id}/services/{serviceId}",
            put(handlers::update_service).delete(handlers::delete_service),
        )
        .with_state(service)
}
