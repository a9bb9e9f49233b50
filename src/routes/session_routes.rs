//! Session bridge endpoints: credential exchange, scope gate and logout.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::{CookieJar, PrivateCookieJar};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::api::ApiRequest;
use crate::config::SessionConfig;
use crate::models::session::Session;
use crate::models::user::SessionUser;
use crate::session::bridge::{get_session_user, SessionAuth};
use crate::session::exchange_token;
use crate::session::grant::TokenGrant;
use crate::state::AppState;
use crate::store::cookie::{session_cookie, user_token_cookie};
use crate::utils::http_helpers::HTTPError;

/// Registers session bridge routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/session/token", post(create_session))
        .route("/session/user", get(session_user))
        .route("/session/logout", post(destroy_session))
}

/// Loose credentials as posted by the browser; the grant kind is selected
/// from which fields are present.
#[derive(Deserialize, Debug)]
struct TokenRequestBody {
    phone: Option<String>,
    code: Option<String>,
    address: Option<String>,
    signature: Option<String>,
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GateReply {
    user: SessionUser,
    is_logged_in: bool,
    scope_error: bool,
}

#[derive(Deserialize)]
struct ScopeQuery {
    /// Comma-separated required scopes, e.g. `scope=admin`.
    scope: Option<String>,
}

/// Reads the session back out of the encrypted cookie.
fn read_session(jar: &PrivateCookieJar, config: &SessionConfig) -> Option<Session> {
    let cookie = jar.get(&config.cookie_name)?;
    serde_json::from_str(cookie.value()).ok()
}

/// Exchanges credentials for a session and persists it: the encrypted
/// session cookie server-side, plus the readable user token cookie mirrored
/// for the client store.
async fn create_session(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    cookies: CookieJar,
    Json(body): Json<TokenRequestBody>,
) -> Result<(PrivateCookieJar, CookieJar, Json<GateReply>), HTTPError> {
    let grant = TokenGrant::from_credentials(
        body.phone,
        body.code,
        body.address,
        body.signature,
        body.text,
    )
    .map_err(|e| HTTPError::new(StatusCode::BAD_REQUEST, e))?;

    let session = exchange_token(state.api.http(), &state.config.token, &grant)
        .await
        .map_err(|e| HTTPError::new(StatusCode::UNAUTHORIZED, e.to_string()))?;

    info!("Session created via '{}' grant", grant.grant_type());

    let payload = serde_json::to_string(&session)
        .map_err(|e| HTTPError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let jar = jar.add(session_cookie(&state.config.session, payload));
    let cookies = cookies.add(user_token_cookie(&state.config.session, &session.token));

    let gate = get_session_user(Some(&session), &[]);
    Ok((
        jar,
        cookies,
        Json(GateReply {
            user: gate.user,
            is_logged_in: gate.is_logged_in,
            scope_error: gate.scope_error,
        }),
    ))
}

/// Returns the session's user view and the coarse scope verdict.
async fn session_user(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Query(query): Query<ScopeQuery>,
) -> Json<GateReply> {
    let session = read_session(&jar, &state.config.session);
    let required: Vec<String> = query
        .scope
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    let gate = get_session_user(session.as_ref(), &required);
    Json(GateReply {
        user: gate.user,
        is_logged_in: gate.is_logged_in,
        scope_error: gate.scope_error,
    })
}

/// Notifies the remote API, then destroys the local session regardless of
/// the remote outcome.
async fn destroy_session(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    cookies: CookieJar,
) -> (PrivateCookieJar, CookieJar, Json<Value>) {
    if let Some(session) = read_session(&jar, &state.config.session) {
        let auth = Arc::new(SessionAuth::new(Some(session)));
        let api = state.api.with_auth(auth);
        let logout = ApiRequest::post(api.logout_path().to_string());
        let result = api.execute::<Value>(logout).await;
        if !result.errors.is_empty() {
            warn!("Remote logout reported errors: {:?}", result.errors);
        }
    }

    // Removal matches on name/path/domain, so rebuild the original shapes.
    let jar = jar.remove(session_cookie(&state.config.session, String::new()));
    let cookies = cookies.remove(user_token_cookie(&state.config.session, ""));
    (jar, cookies, Json(serde_json::json!({ "loggedOut": true })))
}
