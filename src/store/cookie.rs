use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::config::SessionConfig;

/// Receives token mutations from the [`TokenStore`](super::TokenStore) and
/// persists them to whatever cookie surface the process has. Browser-less
/// contexts plug in [`NoCookieSink`].
pub trait CookieSink: Send + Sync {
    fn write_token(&self, token: &str);
    fn clear(&self);
}

/// A sink for contexts without a cookie surface; mutations stay in-process.
pub struct NoCookieSink;

impl CookieSink for NoCookieSink {
    fn write_token(&self, _token: &str) {}
    fn clear(&self) {}
}

/// The non-HTTP-only user token cookie mirrored from the client store,
/// root-path and domain-scoped, session-lived.
pub fn user_token_cookie(config: &SessionConfig, token: &str) -> Cookie<'static> {
    let mut cookie = Cookie::new(config.token_cookie.clone(), token.to_string());
    cookie.set_path("/");
    cookie.set_http_only(false);
    cookie.set_same_site(SameSite::Lax);
    if let Some(domain) = &config.cookie_domain {
        cookie.set_domain(domain.clone());
    }
    cookie
}

/// The encrypted session cookie holding the serialized session fields.
pub fn session_cookie(config: &SessionConfig, payload: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(config.cookie_name.clone(), payload);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    if let Some(domain) = &config.cookie_domain {
        cookie.set_domain(domain.clone());
    }
    cookie
}
