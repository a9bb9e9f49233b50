//! HTTP route definitions and handlers.
//!
//! The session bridge endpoints plus the health check, combined into one
//! router with the application state attached.

mod health_routes;
mod session_routes;

use crate::state::AppState;
use axum::Router;

/// Creates the application router with all configured routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(session_routes::routes())
        .merge(health_routes::routes())
        .with_state(state)
}
