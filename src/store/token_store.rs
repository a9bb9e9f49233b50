use std::sync::Arc;

use tokio::sync::watch;

use crate::api::client::AuthContext;
use crate::models::session::Session;
use crate::store::cookie::CookieSink;

/// The identity snapshot held by the client-side store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenIdentity {
    pub token: Option<String>,
    pub web3_provider: Option<String>,
}

/// Process-wide observable holding the current bearer token and wallet
/// provider, constructed explicitly and passed down rather than living in an
/// ambient singleton. Single writer through the setters, any number of
/// subscribers; every token mutation is written through to the cookie sink.
pub struct TokenStore {
    tx: watch::Sender<TokenIdentity>,
    sink: Arc<dyn CookieSink>,
}

impl TokenStore {
    pub fn new(sink: Arc<dyn CookieSink>) -> Self {
        let (tx, _rx) = watch::channel(TokenIdentity::default());
        TokenStore { tx, sink }
    }

    pub fn snapshot(&self) -> TokenIdentity {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TokenIdentity> {
        self.tx.subscribe()
    }

    pub fn set_token(&self, token: Option<String>) {
        match &token {
            Some(value) => self.sink.write_token(value),
            None => self.sink.clear(),
        }
        self.tx.send_modify(|identity| identity.token = token);
    }

    pub fn set_web3_provider(&self, provider: Option<String>) {
        self.tx.send_modify(|identity| identity.web3_provider = provider);
    }
}

impl AuthContext for TokenStore {
    fn bearer_token(&self) -> Option<String> {
        self.tx.borrow().token.clone()
    }

    fn store_session(&self, session: &Session) {
        self.set_token(Some(session.token.clone()));
    }

    fn clear(&self) {
        self.sink.clear();
        self.tx.send_replace(TokenIdentity::default());
    }
}
