pub mod health;

use axum::{
    middleware,
    routing::{any, get},
    Router,
};

use crate::cors::cors_gate;
use crate::shifts::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/parse-shifts", any(handlers::handle_parse_shifts))
        .layer(middleware::from_fn_with_state(state.clone(), cors_gate))
        .with_state(state)
}
