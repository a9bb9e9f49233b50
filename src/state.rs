//! Shared application state.
//!
//! Contains the state that is shared across all request handlers:
//! configuration, the API client and the session cookie key.

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::ConfigV1;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request handler; the API client inside carries the
/// anonymous auth context, routes rebind it to the request's session.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Request executor bound to the remote API.
    pub api: ApiClient,
    /// Key the encrypted session cookie is sealed with.
    pub key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.key.clone()
    }
}
