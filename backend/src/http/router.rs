//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the API router with versioned endpoints
    let api_v1 = Router::new()
        // Catalog
        .route("/time-blocks", post(handlers::create_time_block))
        .route("/time-blocks", get(handlers::list_time_blocks))
        .route("/members", post(handlers::create_member))
        .route("/members", get(handlers::list_members))
        .route("/cycles", post(handlers::create_cycle))
        .route("/cycles", get(handlers::list_cycles))
        .route("/workshops", post(handlers::create_workshop))
        .route("/workshops", get(handlers::list_workshops))
        // Periods
        .route("/periods", post(handlers::create_period))
        .route("/periods", get(handlers::list_periods))
        .route("/periods/current", get(handlers::get_current_period))
        .route("/periods/{period_id}", get(handlers::get_period))
        .route("/periods/{period_id}", put(handlers::update_period))
        .route(
            "/periods/{period_id}/offerings",
            get(handlers::get_available_offerings),
        )
        // Offerings
        .route("/offerings", post(handlers::create_offering))
        .route("/offerings", get(handlers::list_offerings))
        .route("/offerings/{offering_id}", get(handlers::get_offering))
        .route("/offerings/{offering_id}", delete(handlers::delete_offering))
        // Enrollments
        .route("/enrollments", post(handlers::create_enrollment))
        .route("/enrollments/{enrollment_id}", get(handlers::get_enrollment))
        .route(
            "/enrollments/{enrollment_id}/sessions",
            put(handlers::set_sessions),
        )
        .route(
            "/enrollments/{enrollment_id}/sessions",
            post(handlers::add_sessions),
        )
        .route(
            "/enrollments/{enrollment_id}/eligibility",
            get(handlers::get_eligibility),
        );

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use std::sync::Arc;

    #[test]
    fn test_router_creation() {
        let repo =
            Arc::new(LocalRepository::new()) as Arc<dyn crate::db::repository::FullRepository>;
        let state = AppState::new(repo);
        let _router = create_router(state);
        // If we got here, router was created successfully
    }
}
