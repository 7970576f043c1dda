use futures::{StreamExt, TryStreamExt, future::BoxFuture};
use mongodb::{Collection, Database, bson::doc, options::IndexOptions};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::MongoCardDocument,
};
use crate::dao::{
    card_store::{CardStore, CardWatch, WatchEvent},
    models::{Card, CardRecord, normalize_cards},
    storage::{RepositoryError, StoreResult},
};

const CARD_COLLECTION_NAME: &str = "cards";
const EVENT_CAPACITY: usize = 8;

/// Card store backed by a MongoDB `cards` collection.
///
/// The watch path rides a collection change stream and re-runs the full topic
/// query on every event, so consumers always receive complete snapshots.
#[derive(Clone)]
pub struct MongoCardStore {
    database: Database,
}

impl MongoCardStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (_client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let store = Self { database };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self.collection();
        let index = mongodb::IndexModel::builder()
            .keys(doc! {"topicId": 1, "order": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("card_topic_order_idx".to_owned()))
                    .build(),
            )
            .build();

        collection
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: CARD_COLLECTION_NAME,
                index: "topicId,order",
                source,
            })?;

        Ok(())
    }

    fn collection(&self) -> Collection<MongoCardDocument> {
        self.database
            .collection::<MongoCardDocument>(CARD_COLLECTION_NAME)
    }

    async fn list_cards(&self, topic_id: &str) -> MongoResult<Vec<(String, CardRecord)>> {
        let documents: Vec<MongoCardDocument> = self
            .collection()
            .find(doc! { "topicId": topic_id })
            .await
            .map_err(|source| MongoDaoError::ListCards {
                topic_id: topic_id.to_owned(),
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListCards {
                topic_id: topic_id.to_owned(),
                source,
            })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn snapshot(&self, topic_id: &str) -> MongoResult<Vec<Card>> {
        Ok(normalize_cards(self.list_cards(topic_id).await?))
    }
}

impl CardStore for MongoCardStore {
    fn fetch_cards(&self, topic_id: &str) -> BoxFuture<'static, StoreResult<Vec<Card>>> {
        let store = self.clone();
        let topic_id = topic_id.to_owned();
        Box::pin(async move { store.snapshot(&topic_id).await.map_err(Into::into) })
    }

    fn watch_cards(&self, topic_id: &str) -> BoxFuture<'static, StoreResult<CardWatch>> {
        let store = self.clone();
        let topic_id = topic_id.to_owned();

        Box::pin(async move {
            let mut change_stream =
                store
                    .collection()
                    .watch()
                    .await
                    .map_err(|source| MongoDaoError::WatchCards {
                        topic_id: topic_id.clone(),
                        source,
                    })?;

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

                loop {
                    tokio::select! {
                        _ = tx.closed() => break,
                        event = change_stream.next() => {
                            match event {
                                Some(Ok(_)) => {
                                    match store.snapshot(&task_topic).await {
                                        // Events for other topics re-run the query but
                                        // leave the sequence unchanged; skip those.
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
                                Some(Err(err)) => {
                                    let repo_err = RepositoryError::from(MongoDaoError::WatchCards {
                                        topic_id: task_topic.clone(),
                                        source: err,
                                    });
                                    warn!(topic = %task_topic, error = %repo_err, "card watch lost");
                                    let _ = tx.send(WatchEvent::Lost(repo_err.to_string())).await;
                                    break;
                                }
                                None => {
                                    warn!(topic = %task_topic, "card change stream ended");
                                    let _ = tx
                                        .send(WatchEvent::Lost("card change stream ended".to_owned()))
                                        .await;
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
