//! Seedable in-memory card store used by tests and local development.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tracing::warn;

use super::{CardStore, CardWatch, WatchEvent};
use crate::dao::models::{Card, CardRecord, normalize_cards};
use crate::dao::storage::{RepositoryError, StoreResult};

const CHANGE_CAPACITY: usize = 32;
const EVENT_CAPACITY: usize = 8;

#[derive(Debug, Error)]
#[error("store marked offline")]
struct OfflineError;

/// In-memory document store keyed by topic id.
///
/// Change notifications fan out over a broadcast channel so watches observe
/// the same full-snapshot contract as the remote backends. The `offline`
/// switch makes every read fail, which is how tests drive the error paths.
#[derive(Clone)]
pub struct MemoryCardStore {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    topics: DashMap<String, Vec<(String, CardRecord)>>,
    changes: broadcast::Sender<String>,
    offline: AtomicBool,
}

impl MemoryCardStore {
    /// Create an empty store.
    pub fn new() -> Self {
        let (changes, _receiver) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            inner: Arc::new(MemoryInner {
                topics: DashMap::new(),
                changes,
                offline: AtomicBool::new(false),
            }),
        }
    }

    /// Replace a topic's card collection wholesale, notifying watchers.
    pub fn seed_topic(&self, topic_id: impl Into<String>, cards: Vec<(String, CardRecord)>) {
        let topic_id = topic_id.into();
        self.inner.topics.insert(topic_id.clone(), cards);
        self.notify(topic_id);
    }

    /// Insert or replace a single card, notifying watchers.
    pub fn upsert_card(
        &self,
        topic_id: impl Into<String>,
        card_id: impl Into<String>,
        record: CardRecord,
    ) {
        let topic_id = topic_id.into();
        let card_id = card_id.into();
        let mut entry = self.inner.topics.entry(topic_id.clone()).or_default();
        match entry.iter_mut().find(|(id, _)| *id == card_id) {
            Some(slot) => slot.1 = record,
            None => entry.push((card_id, record)),
        }
        drop(entry);
        self.notify(topic_id);
    }

    /// Remove a single card, notifying watchers.
    pub fn remove_card(&self, topic_id: &str, card_id: &str) {
        if let Some(mut entry) = self.inner.topics.get_mut(topic_id) {
            entry.retain(|(id, _)| id != card_id);
        }
        self.notify(topic_id.to_owned());
    }

    /// Toggle the offline switch; while set every read fails.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    fn notify(&self, topic_id: String) {
        let _ = self.inner.changes.send(topic_id);
    }
}

impl Default for MemoryCardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryInner {
    fn snapshot(&self, topic_id: &str) -> StoreResult<Vec<Card>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RepositoryError::unreachable(
                format!("memory store offline while reading topic `{topic_id}`"),
                OfflineError,
            ));
        }

        let records = self
            .topics
            .get(topic_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        Ok(normalize_cards(records))
    }
}

impl CardStore for MemoryCardStore {
    fn fetch_cards(&self, topic_id: &str) -> BoxFuture<'static, StoreResult<Vec<Card>>> {
        let inner = self.inner.clone();
        let topic_id = topic_id.to_owned();
        Box::pin(async move { inner.snapshot(&topic_id) })
    }

    fn watch_cards(&self, topic_id: &str) -> BoxFuture<'static, StoreResult<CardWatch>> {
        let inner = self.inner.clone();
        let topic_id = topic_id.to_owned();

        Box::pin(async move {
            // Fail fast so a dead store is reported at subscribe time rather
            // than as the first event.
            inner.snapshot(&topic_id)?;

            let (tx, rx) = mpsc::channel(EVENT_CAPACITY);
            let mut changes = inner.changes.subscribe();
            let task_topic = topic_id.clone();

            let task = tokio::spawn(async move {
                match inner.snapshot(&task_topic) {
                    Ok(cards) => {
                        if tx.send(WatchEvent::Snapshot(cards)).await.is_err() {
                            return;
                        }
                    }
                    Err(err) => {
                        let _ = tx.send(WatchEvent::Lost(err.to_string())).await;
                        return;
                    }
                }

                loop {
                    match changes.recv().await {
                        Ok(changed) if changed == task_topic => {}
                        Ok(_) => continue,
                        // A lagged receiver may have missed a matching change;
                        // re-snapshot to stay consistent.
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(topic = %task_topic, skipped, "memory watch lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }

                    match inner.snapshot(&task_topic) {
                        Ok(cards) => {
                            if tx.send(WatchEvent::Snapshot(cards)).await.is_err() {
                                break;
                            }
                        }
                        Err(err) => {
                            let _ = tx.send(WatchEvent::Lost(err.to_string())).await;
                            break;
                        }
                    }
                }
            });

            Ok(CardWatch::new(topic_id, rx, task))
        })
    }
}
