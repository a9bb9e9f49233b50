use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::sync::watch;

use crate::api::client::ApiClient;
use crate::api::request::{ApiRequest, Method};
use crate::models::envelope::ErrorEntry;

/// Lifecycle of an observed query: `Loading` is re-entered whenever the URL
/// changes.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<D> {
    Idle,
    Loading,
    Loaded(D),
    Failed(Vec<ErrorEntry>),
}

impl<D> QueryState<D> {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }
}

/// An observable query over a single endpoint: fetches on creation and on
/// every URL change, publishing state transitions through a watch channel.
///
/// Each issued request carries a sequence number; a response whose sequence
/// is no longer the latest is discarded, so a stale in-flight response never
/// overwrites a newer one. The sequence lock is held across both the bump
/// and the publish, so issuing and resolving cannot interleave.
pub struct ApiQuery<D> {
    client: ApiClient,
    tx: watch::Sender<QueryState<D>>,
    url: Mutex<String>,
    post_data: Option<Map<String, Value>>,
    seq: Arc<Mutex<u64>>,
}

impl<D> ApiQuery<D>
where
    D: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Creates the query and issues the first request. When `post_data` is
    /// given the query POSTs it as a JSON body, otherwise it GETs.
    pub fn new(client: ApiClient, url: impl Into<String>, post_data: Option<Value>) -> Self {
        let (tx, _rx) = watch::channel(QueryState::Idle);
        let post_data = match post_data {
            Some(Value::Object(map)) => Some(map),
            _ => None,
        };
        let query = ApiQuery {
            client,
            tx,
            url: Mutex::new(url.into()),
            post_data,
            seq: Arc::new(Mutex::new(0)),
        };
        query.refetch();
        query
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<D>> {
        self.tx.subscribe()
    }

    pub fn state(&self) -> QueryState<D> {
        self.tx.borrow().clone()
    }

    /// Switches the query to a new URL and re-fetches. Identity comparison on
    /// the string: setting the same URL still re-fetches, matching the
    /// caller-driven re-request semantics.
    pub fn set_url(&self, url: impl Into<String>) {
        *self.url.lock().unwrap() = url.into();
        self.refetch();
    }

    /// Overrides the loaded value locally and invalidates any in-flight
    /// request.
    pub fn set_data(&self, data: D) {
        let mut seq = self.seq.lock().unwrap();
        *seq += 1;
        self.tx.send_replace(QueryState::Loaded(data));
    }

    /// Issues the request for the current URL on a background task.
    pub fn refetch(&self) {
        let issued = {
            let mut seq = self.seq.lock().unwrap();
            *seq += 1;
            self.tx.send_replace(QueryState::Loading);
            *seq
        };

        let url = self.url.lock().unwrap().clone();
        let request = match &self.post_data {
            Some(data) => ApiRequest::new(Method::Post, url).data(Value::Object(data.clone())),
            None => ApiRequest::get(url),
        };
        let client = self.client.clone();
        let tx = self.tx.clone();
        let seq = self.seq.clone();

        tokio::spawn(async move {
            let state = client.execute::<D>(request).await;
            let next = if !state.errors.is_empty() {
                QueryState::Failed(state.errors)
            } else if let Some(envelope) = state.data {
                QueryState::Loaded(envelope.response)
            } else {
                QueryState::Failed(vec![ErrorEntry::Text("Invalid server response".to_string())])
            };
            publish_if_latest(&tx, &seq, issued, next);
        });
    }
}

/// Publishes `next` only when `issued` is still the latest sequence number,
/// discarding out-of-order resolutions. The lock is held across the check
/// and the publish, so a newer request issued in between cannot lose its
/// state to this resolution.
pub(crate) fn publish_if_latest<D>(
    tx: &watch::Sender<QueryState<D>>,
    seq: &Mutex<u64>,
    issued: u64,
    next: QueryState<D>,
) -> bool {
    let seq = seq.lock().unwrap();
    if *seq != issued {
        return false;
    }
    tx.send_replace(next);
    true
}
