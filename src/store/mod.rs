//! Client-side token/identity store and its cookie write-through.

pub mod cookie;
pub mod token_store;

pub use cookie::{session_cookie, user_token_cookie, CookieSink, NoCookieSink};
pub use token_store::{TokenIdentity, TokenStore};
