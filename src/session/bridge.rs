use std::sync::Mutex;

use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::api::client::AuthContext;
use crate::api::error::ApiClientError;
use crate::config::TokenConfig;
use crate::models::session::Session;
use crate::models::user::SessionUser;
use crate::session::grant::TokenGrant;

#[derive(Deserialize, Debug)]
struct TokenEndpointResponse {
    access_token: String,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Exchanges credentials for a session at the remote token endpoint.
///
/// A rejected exchange (any non-2xx) surfaces as [`ApiClientError::Auth`],
/// which renders as "Cannot authorize".
pub async fn exchange_token(
    http: &reqwest::Client,
    config: &TokenConfig,
    grant: &TokenGrant,
) -> Result<Session, ApiClientError> {
    debug!(
        "Exchanging '{}' grant at token endpoint '{}'",
        grant.grant_type(),
        config.endpoint
    );

    let response = http
        .post(&config.endpoint)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(grant.to_body(config))
        .send()
        .await
        .map_err(|e| ApiClientError::Transport {
            text: e.to_string(),
            url: config.endpoint.clone(),
        })?;

    if !response.status().is_success() {
        warn!(
            "Token exchange rejected with status {} for '{}' grant",
            response.status(),
            grant.grant_type()
        );
        return Err(ApiClientError::Auth);
    }

    let body: TokenEndpointResponse = response.json().await.map_err(|_| ApiClientError::Parse)?;
    Ok(Session::new(
        body.access_token,
        body.scope.unwrap_or_default(),
        body.refresh_token,
    ))
}

/// Exchanges a refresh token for a fresh session. Used by the executor's
/// single 401 recovery attempt.
pub async fn refresh_session(
    http: &reqwest::Client,
    config: &TokenConfig,
    refresh_token: &str,
) -> Result<Session, ApiClientError> {
    exchange_token(
        http,
        config,
        &TokenGrant::Refresh {
            refresh_token: refresh_token.to_string(),
        },
    )
    .await
}

/// The authorization verdict for a server-rendered request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionGate {
    pub user: SessionUser,
    pub is_logged_in: bool,
    pub scope_error: bool,
}

/// Derives the user view and the coarse authorization verdict from a session.
///
/// `is_logged_in` is true iff a token is present. `scope_error` is true iff
/// `required_scopes` is non-empty and none of the granted scopes intersect it.
pub fn get_session_user(session: Option<&Session>, required_scopes: &[String]) -> SessionGate {
    let user = session.map(SessionUser::from_session).unwrap_or_default();
    let is_logged_in = session.map(|s| !s.token.is_empty()).unwrap_or(false);
    let scope_error =
        !required_scopes.is_empty() && !required_scopes.iter().any(|scope| user.has_scope(scope));
    SessionGate {
        user,
        is_logged_in,
        scope_error,
    }
}

/// Per-request auth context over the cookie-backed session. One per server
/// request; mutated only by the executor's refresh recovery.
pub struct SessionAuth {
    inner: Mutex<Option<Session>>,
}

impl SessionAuth {
    pub fn new(session: Option<Session>) -> Self {
        SessionAuth {
            inner: Mutex::new(session),
        }
    }

    /// The session after the request ran, with any refresh applied.
    pub fn session(&self) -> Option<Session> {
        self.inner.lock().unwrap().clone()
    }
}

impl AuthContext for SessionAuth {
    fn bearer_token(&self) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .as_ref()
            .map(|s| s.token.clone())
            .filter(|t| !t.is_empty())
    }

    fn refresh_token(&self) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|s| s.refresh_token.clone())
    }

    fn store_session(&self, session: &Session) {
        *self.inner.lock().unwrap() = Some(session.clone());
    }

    fn clear(&self) {
        *self.inner.lock().unwrap() = None;
    }
}
