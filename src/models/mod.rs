//! Data model shared across the request executor, session bridge and routes.

pub mod envelope;
pub mod session;
pub mod user;

pub use envelope::{ApiState, Envelope, ErrorEntry};
pub use session::Session;
pub use user::SessionUser;
