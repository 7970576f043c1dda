#[cfg(feature = "firestore-store")]
pub mod firestore;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use futures::future::BoxFuture;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use crate::dao::models::Card;
use crate::dao::storage::StoreResult;

/// Notification delivered by a live card watch.
///
/// Every update carries the full re-mapped sequence, never a delta. A watch
/// that fails delivers [`WatchEvent::Lost`] exactly once and then ends; the
/// consumer must re-subscribe to resume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Full point-in-time materialization of the topic's card collection.
    Snapshot(Vec<Card>),
    /// The watch failed with a user-safe message and will deliver no more events.
    Lost(String),
}

/// Live subscription to a topic's card collection.
///
/// Dropping the watch detaches it from the store; detach happens exactly once
/// even on error paths, so holding the watch for the lifetime of the consuming
/// view is sufficient to avoid leaks.
pub struct CardWatch {
    id: Uuid,
    topic_id: String,
    events: mpsc::Receiver<WatchEvent>,
    task: JoinHandle<()>,
}

impl CardWatch {
    /// Bind a receiver and its producing task into a scoped subscription.
    pub(crate) fn new(topic_id: String, events: mpsc::Receiver<WatchEvent>, task: JoinHandle<()>) -> Self {
        let id = Uuid::new_v4();
        debug!(watch = %id, topic = %topic_id, "card watch attached");
        Self {
            id,
            topic_id,
            events,
            task,
        }
    }

    /// Receive the next watch event; `None` once the watch has ended.
    pub async fn next_event(&mut self) -> Option<WatchEvent> {
        self.events.recv().await
    }

    /// Identifier of the watched topic.
    pub fn topic_id(&self) -> &str {
        &self.topic_id
    }

    /// Explicitly release the watch. Equivalent to dropping it.
    pub fn detach(self) {}
}

impl Drop for CardWatch {
    fn drop(&mut self) {
        self.task.abort();
        debug!(watch = %self.id, topic = %self.topic_id, "card watch detached");
    }
}

/// Abstraction over the remote document store holding topic card collections.
pub trait CardStore: Send + Sync {
    /// One-shot read of a topic's cards, normalized and in canonical order.
    fn fetch_cards(&self, topic_id: &str) -> BoxFuture<'static, StoreResult<Vec<Card>>>;
    /// Establish a standing watch on a topic's card collection.
    fn watch_cards(&self, topic_id: &str) -> BoxFuture<'static, StoreResult<CardWatch>>;
}
