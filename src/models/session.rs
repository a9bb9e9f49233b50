use serde::{Deserialize, Serialize};

/// Server-held authentication state, one per HTTP request lifecycle.
///
/// Created by a successful token exchange, persisted in the encrypted session
/// cookie, destroyed on logout.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub token: String,
    /// Space- or comma-delimited role set granted by the token endpoint.
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl Session {
    pub fn new(token: String, scope: String, refresh_token: Option<String>) -> Self {
        Session {
            token,
            scope,
            refresh_token,
        }
    }

    /// Splits the raw scope string into individual role names.
    pub fn scopes(&self) -> Vec<String> {
        self.scope
            .split([' ', ','])
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}
