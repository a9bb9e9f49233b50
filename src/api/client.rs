use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::request::{ApiRequest, AuthDirective};
use crate::config::{ApiConfig, TokenConfig};
use crate::models::envelope::{ApiState, Envelope, ErrorEntry};
use crate::models::session::Session;
use crate::session::bridge::refresh_session;
use crate::utils::value::value_to_string;

const INVALID_RESPONSE: &str = "Invalid server response";

/// Where the executor finds the current bearer token and where it pushes a
/// refreshed session. Implemented by the client-side token store and by the
/// per-request server session; handlers pass the context explicitly instead
/// of reading a process-wide singleton.
pub trait AuthContext: Send + Sync {
    fn bearer_token(&self) -> Option<String>;

    fn refresh_token(&self) -> Option<String> {
        None
    }

    fn store_session(&self, _session: &Session) {}

    /// Called after an irrecoverable 401.
    fn clear(&self) {}
}

/// Auth context for calls made outside any session.
pub struct Anonymous;

impl AuthContext for Anonymous {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

/// Executes requests against the remote Connect.Club API, normalizing the
/// envelope and failure shapes into [`ApiState`].
///
/// Every call is independent: no caching, no deduplication, timeouts left to
/// the transport defaults.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    logout_path: String,
    token: TokenConfig,
    auth: Arc<dyn AuthContext>,
}

impl ApiClient {
    pub fn new(api: &ApiConfig, token: &TokenConfig, auth: Arc<dyn AuthContext>) -> Self {
        ApiClient {
            http: reqwest::Client::new(),
            base_url: api.base_url.trim_end_matches('/').to_string(),
            logout_path: api.logout_path.clone(),
            token: token.clone(),
            auth,
        }
    }

    /// Cheap clone bound to a different auth context, e.g. the session of the
    /// current server request.
    pub fn with_auth(&self, auth: Arc<dyn AuthContext>) -> Self {
        ApiClient {
            auth,
            ..self.clone()
        }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn auth(&self) -> &Arc<dyn AuthContext> {
        &self.auth
    }

    pub fn token_config(&self) -> &TokenConfig {
        &self.token
    }

    pub fn logout_path(&self) -> &str {
        &self.logout_path
    }

    fn resolve_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    /// Builds and sends a single request, normalizing success and failure
    /// shapes. On a 401 attempts one token refresh and retries the original
    /// request once; a second 401 clears the auth context and surfaces the
    /// error.
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiState<T> {
        if request.endpoint.is_empty() {
            return ApiState::failed(vec![ErrorEntry::Text(
                "Request endpoint is empty".to_string(),
            )]);
        }

        let url = self.resolve_url(&request.endpoint);
        let mut refreshed = false;

        loop {
            let response = match self.send(&request, &url).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("Request to '{}' failed: {}", url, e);
                    return ApiState::failed(vec![ErrorEntry::Detail {
                        text: e.to_string(),
                        url,
                        data: request.data_value(),
                        status_code: None,
                    }]);
                }
            };

            let status = response.status();

            if status == StatusCode::UNAUTHORIZED {
                if !refreshed {
                    refreshed = true;
                    if let Some(refresh_token) = self.auth.refresh_token() {
                        match refresh_session(&self.http, &self.token, &refresh_token).await {
                            Ok(session) => {
                                debug!("Refreshed session after 401 on '{}'", url);
                                self.auth.store_session(&session);
                                continue;
                            }
                            Err(e) => warn!("Token refresh failed: {}", e),
                        }
                    }
                }
                self.auth.clear();
                return ApiState::failed(vec![ErrorEntry::Detail {
                    text: "Unauthorized".to_string(),
                    url,
                    data: request.data_value(),
                    status_code: Some(status.as_u16()),
                }]);
            }

            if status.is_success() {
                let body = match response.text().await {
                    Ok(body) => body,
                    Err(e) => {
                        return ApiState::failed(vec![ErrorEntry::Detail {
                            text: e.to_string(),
                            url,
                            data: request.data_value(),
                            status_code: Some(status.as_u16()),
                        }]);
                    }
                };
                return match serde_json::from_str::<Envelope<T>>(&body) {
                    Ok(envelope) => ApiState::loaded(envelope),
                    Err(e) => {
                        debug!("Failed to parse envelope from '{}': {}", url, e);
                        ApiState::failed(vec![ErrorEntry::Text(INVALID_RESPONSE.to_string())])
                    }
                };
            }

            let body = response.text().await.unwrap_or_default();
            return ApiState::failed(error_entries(&body, status));
        }
    }

    async fn send(
        &self,
        request: &ApiRequest,
        url: &str,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let mut builder = self.http.request(request.method.into(), url);

        if request.method.sends_query() {
            let pairs = request.query_pairs();
            if !pairs.is_empty() {
                builder = builder.query(&pairs);
            }
        } else if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        } else {
            builder = builder.json(&request.data_value());
        }

        match request.auth_directive() {
            AuthDirective::Suppressed => {}
            AuthDirective::Explicit(value) => {
                builder = builder.header(AUTHORIZATION, value);
            }
            AuthDirective::Ambient => {
                if let Some(token) = self.auth.bearer_token() {
                    builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
                }
            }
        }

        for (name, value) in request.extra_headers() {
            builder = builder.header(name, value);
        }

        builder.send().await
    }
}

/// Error entries for a non-2xx response: the body's `errors` array when one
/// parses, otherwise the status line.
fn error_entries(body: &str, status: StatusCode) -> Vec<ErrorEntry> {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(errors) = value.get("errors").and_then(Value::as_array) {
            if !errors.is_empty() {
                return errors
                    .iter()
                    .map(|item| {
                        serde_json::from_value::<ErrorEntry>(item.clone())
                            .unwrap_or_else(|_| ErrorEntry::Text(value_to_string(item.clone())))
                    })
                    .collect();
            }
        }
    }
    vec![ErrorEntry::Text(status.to_string())]
}
