//! HTTP server for Concierge.
//!
//! Provides endpoints for:
//! - Errands (`/api/doordash/delivery`, `/api/doordash/status/:id`)
//! - Rides (`/api/uber/request`, `/api/uber/status/:trip_id`)
//! - Health check (`/health`)
//!
//! Status endpoints take the task reference from the query string; see
//! [`concierge_core::query`] for the parameter names.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

mod handlers;
pub mod responses;

/// Create the HTTP router.
pub fn create_router(state: Arc<AppState>) -> Router {
    // The UI is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/doordash/delivery", post(handlers::create_delivery))
        .route("/api/doordash/status/:id", get(handlers::delivery_status))
        .route("/api/uber/request", post(handlers::request_ride))
        .route("/api/uber/status/:trip_id", get(handlers::ride_status))
        .route("/health", get(handlers::health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
