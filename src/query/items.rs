use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::watch;

use crate::api::client::ApiClient;
use crate::api::request::ApiRequest;
use crate::query::query::QueryState;

/// One page of a cursor-paginated listing. `last_value` is the opaque cursor
/// to pass back when requesting the next page; null means the listing is
/// exhausted.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<D> {
    #[serde(default = "Vec::new")]
    pub items: Vec<D>,
    #[serde(default)]
    pub last_value: Option<i64>,
}

/// An observable paginated query: unwraps the `{items, lastValue}` envelope
/// into a flat, growing sequence. `load_more` requests the next page using
/// the cursor from the previous one and appends.
pub struct ItemsQuery<D> {
    client: ApiClient,
    url: String,
    tx: watch::Sender<QueryState<Vec<D>>>,
    items: Mutex<Vec<D>>,
    last_value: Mutex<Option<i64>>,
    seq: Mutex<u64>,
}

impl<D> ItemsQuery<D>
where
    D: DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(client: ApiClient, url: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(QueryState::Idle);
        ItemsQuery {
            client,
            url: url.into(),
            tx,
            items: Mutex::new(Vec::new()),
            last_value: Mutex::new(None),
            seq: Mutex::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<Vec<D>>> {
        self.tx.subscribe()
    }

    pub fn state(&self) -> QueryState<Vec<D>> {
        self.tx.borrow().clone()
    }

    pub fn items(&self) -> Vec<D> {
        self.items.lock().unwrap().clone()
    }

    /// The cursor returned by the last loaded page.
    pub fn last_value(&self) -> Option<i64> {
        *self.last_value.lock().unwrap()
    }

    /// Fetches the next page and appends its items. The first call loads the
    /// first page; later calls pass the stored cursor.
    ///
    /// Overlapping calls are resolved by sequence number: only the latest
    /// issued request may append and publish, so a superseded resolution
    /// never touches the accumulated items or the cursor.
    pub async fn load_more(&self) {
        let issued = {
            let mut seq = self.seq.lock().unwrap();
            *seq += 1;
            self.tx.send_replace(QueryState::Loading);
            *seq
        };

        let mut request = ApiRequest::get(self.url.clone());
        if let Some(cursor) = self.last_value() {
            request = request.field("lastValue", cursor);
        }

        let state = self.client.execute::<Page<D>>(request).await;

        let seq = self.seq.lock().unwrap();
        if *seq != issued {
            return;
        }
        let next = if !state.errors.is_empty() {
            QueryState::Failed(state.errors)
        } else if let Some(envelope) = state.data {
            let all = {
                let mut items = self.items.lock().unwrap();
                items.extend(envelope.response.items);
                items.clone()
            };
            *self.last_value.lock().unwrap() = envelope.response.last_value;
            QueryState::Loaded(all)
        } else {
            QueryState::Failed(vec![crate::models::envelope::ErrorEntry::Text(
                "Invalid server response".to_string(),
            )])
        };
        self.tx.send_replace(next);
    }
}
