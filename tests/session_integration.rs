mod common;

use axum::http::{Method, StatusCode};
use mockito::{Matcher, Server};
use serde_json::json;
use tower::ServiceExt;

use common::{body_json, build_app, json_request, request_with_cookies, set_cookie_pairs, test_config};

/// Test that an SMS token exchange creates the session and mirrors the token
/// into the readable client cookie.
#[tokio::test]
async fn test_sms_exchange_sets_cookies() {
    let mut server = Server::new_async().await;
    let token_mock = server
        .mock("POST", "/oauth/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "sms".into()),
            Matcher::UrlEncoded("phone".into(), "+1".into()),
            Matcher::UrlEncoded("code".into(), "000".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"access_token":"tok","scope":"user","refresh_token":"ref"}"#)
        .create_async()
        .await;

    let (app, _config) = build_app(test_config(&server.url())).await;
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/session/token",
            json!({"phone": "+1", "code": "000"}),
        ))
        .await
        .unwrap();

    token_mock.assert_async().await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookies = set_cookie_pairs(&response);
    assert!(cookies.iter().any(|c| c.starts_with("cc_session=")));
    assert!(cookies.contains(&"ccUserToken=tok".to_string()));

    let body = body_json(response).await;
    assert_eq!(body["isLoggedIn"], json!(true));
    assert_eq!(body["scopeError"], json!(false));
    assert_eq!(body["user"]["scopes"], json!(["user"]));
}

/// Test that a rejected code surfaces as 401 "Cannot authorize".
#[tokio::test]
async fn test_invalid_code_rejected() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/oauth/token")
        .with_status(400)
        .with_body(r#"{"error":"invalid_grant"}"#)
        .create_async()
        .await;

    let (app, _config) = build_app(test_config(&server.url())).await;
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/session/token",
            json!({"phone": "+1", "code": "999"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], json!("Cannot authorize"));
}

/// Test that incomplete credentials never reach the token endpoint.
#[tokio::test]
async fn test_missing_credentials_rejected() {
    let mut server = Server::new_async().await;
    let token_mock = server
        .mock("POST", "/oauth/token")
        .expect(0)
        .create_async()
        .await;

    let (app, _config) = build_app(test_config(&server.url())).await;
    let response = app
        .oneshot(json_request(Method::POST, "/session/token", json!({"phone": "+1"})))
        .await
        .unwrap();

    token_mock.assert_async().await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Test that a wallet signature selects the wallet grant.
#[tokio::test]
async fn test_wallet_exchange() {
    let mut server = Server::new_async().await;
    let token_mock = server
        .mock("POST", "/oauth/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "wallet".into()),
            Matcher::UrlEncoded("address".into(), "0xabc".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"access_token":"tok","scope":"","refresh_token":null}"#)
        .create_async()
        .await;

    let (app, _config) = build_app(test_config(&server.url())).await;
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/session/token",
            json!({"address": "0xabc", "signature": "0xsig", "text": "challenge"}),
        ))
        .await
        .unwrap();

    token_mock.assert_async().await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// Test the anonymous scope gate: not logged in, and a scope requirement
/// fails against an empty scope set.
#[tokio::test]
async fn test_session_user_anonymous() {
    let server = Server::new_async().await;
    let (app, _config) = build_app(test_config(&server.url())).await;

    let response = app
        .clone()
        .oneshot(request_with_cookies(Method::GET, "/session/user", ""))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["isLoggedIn"], json!(false));
    assert_eq!(body["scopeError"], json!(false));

    let response = app
        .oneshot(request_with_cookies(Method::GET, "/session/user?scope=admin", ""))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["scopeError"], json!(true));
}

/// Test that the session cookie round-trips through the scope gate.
#[tokio::test]
async fn test_session_user_round_trip() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/oauth/token")
        .with_status(200)
        .with_body(r#"{"access_token":"tok","scope":"admin","refresh_token":null}"#)
        .create_async()
        .await;

    let (app, _config) = build_app(test_config(&server.url())).await;
    let login = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/session/token",
            json!({"phone": "+1", "code": "000"}),
        ))
        .await
        .unwrap();
    let cookies = set_cookie_pairs(&login).join("; ");

    let response = app
        .clone()
        .oneshot(request_with_cookies(Method::GET, "/session/user?scope=admin", &cookies))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["isLoggedIn"], json!(true));
    assert_eq!(body["scopeError"], json!(false));
    assert_eq!(body["user"]["scopes"], json!(["admin"]));

    // A requirement outside the granted set still fails.
    let response = app
        .oneshot(request_with_cookies(
            Method::GET,
            "/session/user?scope=moderator",
            &cookies,
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["scopeError"], json!(true));
}

/// Test that logout notifies the remote API and expires both cookies.
#[tokio::test]
async fn test_logout_destroys_session() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/oauth/token")
        .with_status(200)
        .with_body(r#"{"access_token":"tok","scope":"user","refresh_token":null}"#)
        .create_async()
        .await;
    let logout_mock = server
        .mock("POST", "/v1/account/logout")
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_body(r#"{"requestId":"r1","errors":[],"response":null}"#)
        .create_async()
        .await;

    let (app, _config) = build_app(test_config(&server.url())).await;
    let login = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/session/token",
            json!({"phone": "+1", "code": "000"}),
        ))
        .await
        .unwrap();
    let cookies = set_cookie_pairs(&login).join("; ");

    let response = app
        .oneshot(request_with_cookies(Method::POST, "/session/logout", &cookies))
        .await
        .unwrap();

    logout_mock.assert_async().await;
    assert_eq!(response.status(), StatusCode::OK);

    // Both cookies come back emptied.
    let removed = set_cookie_pairs(&response);
    assert!(removed.contains(&"cc_session=".to_string()));
    assert!(removed.contains(&"ccUserToken=".to_string()));

    let body = body_json(response).await;
    assert_eq!(body["loggedOut"], json!(true));
}

/// Test the liveness probe.
#[tokio::test]
async fn test_health_check() {
    let server = Server::new_async().await;
    let (app, _config) = build_app(test_config(&server.url())).await;

    let response = app
        .oneshot(request_with_cookies(Method::GET, "/health", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
