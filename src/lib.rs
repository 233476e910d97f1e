pub mod config;
pub mod models;
pub mod repositories;
pub mod services;
pub mod handlers;
pub mod middleware;
pub mod utils;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use handlers::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .route("/sync", post(handlers::sync::run_sync))
                .route("/health", get(handlers::sync::health_check)),
        )
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
}
