pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/recipes/:category/batch",
            post(handlers::handle_request_batch),
        )
        .route(
            "/api/v1/recipes/:category/history",
            get(handlers::handle_history),
        )
        .with_state(state)
}
