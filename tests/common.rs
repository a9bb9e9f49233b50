use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, Response};
use axum::Router;
use axum_extra::extract::cookie::Key;
use clubgate::api::{Anonymous, ApiClient};
use clubgate::config::{ApiConfig, ConfigV1, LoggingConfig, SessionConfig, TokenConfig};
use clubgate::routes::create_router;
use clubgate::state::AppState;
use serde_json::Value;

pub const TEST_SECRET: &str = "0123456789abcdef0123456789abcdef0123456789abcdef";

/// Builds a config whose remote API and token endpoint both point at the
/// given mock server URL.
pub fn test_config(remote_url: &str) -> ConfigV1 {
    ConfigV1 {
        api: ApiConfig {
            base_url: remote_url.to_string(),
            logout_path: "/v1/account/logout".to_string(),
        },
        token: TokenConfig {
            endpoint: format!("{}/oauth/token", remote_url),
            client_id: "cc_web".to_string(),
            client_secret: "s3cret".to_string(),
            device_id: "device-1".to_string(),
        },
        session: SessionConfig {
            cookie_name: "cc_session".to_string(),
            secret: TEST_SECRET.to_string(),
            token_cookie: "ccUserToken".to_string(),
            cookie_domain: None,
        },
        bind_address: "127.0.0.1:8081".to_string(),
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "console".to_string(),
        },
    }
}

pub async fn build_app(config: ConfigV1) -> (Router, Arc<ConfigV1>) {
    let config = Arc::new(config);
    let key = Key::derive_from(config.session.secret.as_bytes());
    let api = ApiClient::new(&config.api, &config.token, Arc::new(Anonymous));

    let state = AppState {
        config: config.clone(),
        api,
        key,
    };

    (create_router(state), config)
}

pub fn json_request(method: Method, path: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub fn request_with_cookies(method: Method, path: &str, cookies: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header(header::COOKIE, cookies)
        .body(Body::empty())
        .expect("failed to build request")
}

/// Collects the name=value pairs from every Set-Cookie header, ready to be
/// sent back in a Cookie header.
pub fn set_cookie_pairs(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::to_string)
        .collect()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
