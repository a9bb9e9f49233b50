//! Application startup and server initialization.
//!
//! Builds the API client and shared state, derives the session cookie key,
//! and starts serving the configured routes.

use std::sync::Arc;

use axum_extra::extract::cookie::Key;
use tokio::net::TcpListener;
use tracing::info;

use crate::api::{Anonymous, ApiClient};
use crate::config::ConfigV1;
use crate::routes;
use crate::state::AppState;

/// Initializes and runs the application server.
///
/// # Errors
///
/// Returns an error if the server fails to bind to the specified address
/// or encounters a runtime error during execution.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let key = Key::derive_from(config.session.secret.as_bytes());
    let api = ApiClient::new(&config.api, &config.token, Arc::new(Anonymous));

    info!("Starting server on {}", config.bind_address);

    let state = AppState {
        config: config.clone(),
        api,
        key,
    };

    let app = routes::create_router(state);

    let listener = TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
