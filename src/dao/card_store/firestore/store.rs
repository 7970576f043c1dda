use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use reqwest::Client;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::{
    config::FirestoreConfig,
    error::{FirestoreError, FirestoreResult},
    models::{FirestoreDocument, ListDocumentsResponse},
};
use crate::dao::{
    card_store::{CardStore, CardWatch, WatchEvent},
    models::{Card, CardRecord, normalize_cards},
    storage::{RepositoryError, StoreResult},
};

const PAGE_SIZE: &str = "300";
const EVENT_CAPACITY: usize = 8;

/// Card store backed by the Firestore REST document surface.
///
/// The REST surface has no push channel, so the watch path re-lists the
/// collection on an interval and emits a snapshot whenever the mapped
/// sequence changed.
#[derive(Clone)]
pub struct FirestoreCardStore {
    client: Client,
    base_url: Arc<str>,
    api_key: Option<Arc<str>>,
    poll_interval: Duration,
}

impl FirestoreCardStore {
    /// Build the HTTP client and verify the project is reachable.
    pub async fn connect(config: FirestoreConfig) -> FirestoreResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| FirestoreError::ClientBuilder { source })?;

        let base_url = Arc::<str>::from(config.resolve_base_url());
        let api_key = config.api_key.as_deref().map(Arc::<str>::from);

        let store = Self {
            client,
            base_url,
            api_key,
            poll_interval: config.poll_interval,
        };

        store.verify_reachable().await?;
        info!(project = %config.project_id, "connected to Firestore");
        Ok(store)
    }

    async fn verify_reachable(&self) -> FirestoreResult<()> {
        let path = "topics".to_owned();
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, path))
            .query(&[("pageSize", "1")])
            .query(&self.key_param())
            .send()
            .await
            .map_err(|source| FirestoreError::RequestSend {
                path: path.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FirestoreError::RequestStatus { path, status });
        }
        Ok(())
    }

    fn key_param(&self) -> Vec<(&'static str, String)> {
        self.api_key
            .iter()
            .map(|key| ("key", key.to_string()))
            .collect()
    }

    /// List every card document under the topic, following pagination.
    async fn list_cards(&self, topic_id: &str) -> FirestoreResult<Vec<(String, CardRecord)>> {
        let path = format!("topics/{topic_id}/cards");
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(format!("{}/{}", self.base_url, path))
                .query(&[("pageSize", PAGE_SIZE)])
                .query(&self.key_param());
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request
                .send()
                .await
                .map_err(|source| FirestoreError::RequestSend {
                    path: path.clone(),
                    source,
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(FirestoreError::RequestStatus {
                    path: path.clone(),
                    status,
                });
            }

            let payload: ListDocumentsResponse =
                response
                    .json()
                    .await
                    .map_err(|source| FirestoreError::DecodeResponse {
                        path: path.clone(),
                        source,
                    })?;

            records.extend(payload.documents.into_iter().map(FirestoreDocument::into_record));

            match payload.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(records)
    }

    async fn snapshot(&self, topic_id: &str) -> FirestoreResult<Vec<Card>> {
        Ok(normalize_cards(self.list_cards(topic_id).await?))
    }
}

impl CardStore for FirestoreCardStore {
    fn fetch_cards(&self, topic_id: &str) -> BoxFuture<'static, StoreResult<Vec<Card>>> {
        let store = self.clone();
        let topic_id = topic_id.to_owned();
        Box::pin(async move { store.snapshot(&topic_id).await.map_err(Into::into) })
    }

    fn watch_cards(&self, topic_id: &str) -> BoxFuture<'static, StoreResult<CardWatch>> {
        let store = self.clone();
        let topic_id = topic_id.to_owned();

        Box::pin(async move {
            // Surface an unreachable store at subscribe time rather than as
            // the first event.
            let initial = store
                .snapshot(&topic_id)
                .await
                .map_err(RepositoryError::from)?;

            let (tx, rx) = mpsc::channel(EVENT_CAPACITY);
            let task_topic = topic_id.clone();

            let task = tokio::spawn(async move {
                if tx.send(WatchEvent::Snapshot(initial.clone())).await.is_err() {
                    return;
                }
                let mut last = initial;

                let mut ticker = tokio::time::interval(store.poll_interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                // The first tick resolves immediately; the initial snapshot
                // was already delivered.
                ticker.tick().await;

                loop {
                    tokio::select! {
                        _ = tx.closed() => break,
                        _ = ticker.tick() => {
                            match store.snapshot(&task_topic).await {
                                Ok(cards) if cards != last => {
                                    debug!(topic = %task_topic, count = cards.len(), "card collection changed");
                                    last = cards.clone();
                                    if tx.send(WatchEvent::Snapshot(cards)).await.is_err() {
                                        break;
                                    }
                                }
                                Ok(_) => {}
                                Err(err) => {
                                    let repo_err = RepositoryError::from(err);
                                    warn!(topic = %task_topic, error = %repo_err, "card watch lost");
                                    let _ = tx.send(WatchEvent::Lost(repo_err.to_string())).await;
                                    break;
                                }
                            }
                        }
                    }
                }
            });

            Ok(CardWatch::new(topic_id, rx, task))
        })
    }
}
