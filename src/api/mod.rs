//! The request executor: builds, authenticates and sends single API calls.

pub mod client;
pub mod error;
pub mod request;

pub use client::{Anonymous, ApiClient, AuthContext};
pub use error::ApiClientError;
pub use request::{ApiRequest, Method};
