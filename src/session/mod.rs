//! Server-boundary session handling: credential exchange at the remote token
//! endpoint and the coarse scope gate for server-rendered requests.

pub mod bridge;
pub mod grant;

pub use bridge::{exchange_token, get_session_user, refresh_session, SessionAuth, SessionGate};
pub use grant::TokenGrant;
