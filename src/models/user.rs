use serde::{Deserialize, Serialize};

use crate::models::session::Session;

/// The user view derived from a session, as handed to rendering code.
///
/// Possibly empty: an anonymous request still yields a `SessionUser`, just
/// with no scopes.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionUser {
    pub scopes: Vec<String>,
}

impl SessionUser {
    pub fn from_session(session: &Session) -> Self {
        SessionUser {
            scopes: session.scopes(),
        }
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}
