//! Route definitions for the SeatPool HTTP API.
//!
//! All routes are mounted under `/api` and receive `AppState` through
//! Axum's `State` extractor.

use axum::{
    Router,
    http::Uri,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use seatpool_core::error::AppError;

use crate::error::ApiError;
use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(license_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// License session endpoints
fn license_routes() -> Router<AppState> {
    Router::new()
        .route("/license/login", post(handlers::license::login))
        .route("/license/heartbeat", post(handlers::license::heartbeat))
        .route("/license/logout", post(handlers::license::logout))
        .route("/license/pool", get(handlers::license::pool_status))
        .route("/license/sweep", post(handlers::license::sweep))
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// JSON 404 for any path without a route
async fn route_not_found(uri: Uri) -> ApiError {
    AppError::not_found(format!("No route for {}", uri.path())).into()
}
