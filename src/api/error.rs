use thiserror::Error;

/// Failure classes of the request executor and token bridge.
///
/// Transport and Parse surface as opaque strings; Auth is recovered once via
/// the refresh flow before being surfaced. Server-side validation errors are
/// not represented here: they travel inside the response envelope.
#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("{text}")]
    Transport { text: String, url: String },
    #[error("Cannot authorize")]
    Auth,
    #[error("Invalid server response")]
    Parse,
}
