use dashmap::DashMap;
use serde::Serialize;
use tracing::debug;

use crate::dao::models::Card;

/// Load state of one topic's card collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicStatus {
    /// No request has been made for this topic yet.
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The last fetch succeeded.
    Loaded,
    /// The last fetch failed.
    Error,
}

/// Cached load-state record for one topic id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicEntry {
    /// Cards in canonical order as of the last successful fetch.
    pub cards: Vec<Card>,
    /// Current load state.
    pub status: TopicStatus,
    /// User-safe message of the last failure, if any.
    pub error: Option<String>,
}

impl Default for TopicEntry {
    fn default() -> Self {
        Self {
            cards: Vec::new(),
            status: TopicStatus::Idle,
            error: None,
        }
    }
}

/// Session-scoped keyed cache of per-topic load state.
///
/// Entries are only ever replaced wholesale; concurrent requests for the same
/// topic are not merged, so the last fetch to settle wins.
pub struct TopicCache {
    entries: DashMap<String, TopicEntry>,
}

impl TopicCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Pure lookup; a topic that was never requested yields the idle default.
    pub fn select_entry(&self, topic_id: &str) -> TopicEntry {
        self.entries
            .get(topic_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Move the entry to `loading`, clearing a prior error but keeping the
    /// previously loaded cards visible.
    pub fn begin_request(&self, topic_id: &str) {
        let previous = self.select_entry(topic_id);
        self.entries.insert(
            topic_id.to_owned(),
            TopicEntry {
                cards: previous.cards,
                status: TopicStatus::Loading,
                error: None,
            },
        );
    }

    /// Replace the entry with a successful result.
    pub fn complete(&self, topic_id: &str, cards: Vec<Card>) {
        self.entries.insert(
            topic_id.to_owned(),
            TopicEntry {
                cards,
                status: TopicStatus::Loaded,
                error: None,
            },
        );
    }

    /// Replace the entry with a failure, keeping previously loaded cards.
    pub fn fail(&self, topic_id: &str, message: impl Into<String>) {
        let previous = self.select_entry(topic_id);
        self.entries.insert(
            topic_id.to_owned(),
            TopicEntry {
                cards: previous.cards,
                status: TopicStatus::Error,
                error: Some(message.into()),
            },
        );
    }

    /// Drop every entry; invoked when the session identity changes.
    pub fn clear(&self) {
        let count = self.entries.len();
        self.entries.clear();
        debug!(count, "topic cache cleared");
    }
}

impl Default for TopicCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::{Card, CardRecord};

    fn card(id: &str) -> Card {
        Card::from_record(id, CardRecord::default())
    }

    #[test]
    fn unknown_topic_yields_idle_default() {
        let cache = TopicCache::new();
        let entry = cache.select_entry("amor");
        assert_eq!(entry, TopicEntry::default());
        assert_eq!(entry.status, TopicStatus::Idle);
        assert!(entry.cards.is_empty());
        assert!(entry.error.is_none());
    }

    #[test]
    fn select_entry_never_creates_an_entry() {
        let cache = TopicCache::new();
        cache.select_entry("amor");
        assert!(cache.entries.is_empty());
    }

    #[test]
    fn request_then_complete_reaches_loaded() {
        let cache = TopicCache::new();
        cache.begin_request("amor");
        assert_eq!(cache.select_entry("amor").status, TopicStatus::Loading);

        cache.complete("amor", vec![card("amor-001")]);
        let entry = cache.select_entry("amor");
        assert_eq!(entry.status, TopicStatus::Loaded);
        assert_eq!(entry.cards.len(), 1);
        assert!(entry.error.is_none());
    }

    #[test]
    fn failure_keeps_previous_cards_and_sets_message() {
        let cache = TopicCache::new();
        cache.complete("amor", vec![card("amor-001")]);

        cache.begin_request("amor");
        cache.fail("amor", "No se pudieron cargar las cartas.");

        let entry = cache.select_entry("amor");
        assert_eq!(entry.status, TopicStatus::Error);
        assert_eq!(entry.cards.len(), 1);
        assert_eq!(entry.error.as_deref(), Some("No se pudieron cargar las cartas."));
    }

    #[test]
    fn a_fresh_request_clears_the_error() {
        let cache = TopicCache::new();
        cache.begin_request("amor");
        cache.fail("amor", "sin conexión");

        cache.begin_request("amor");
        let entry = cache.select_entry("amor");
        assert_eq!(entry.status, TopicStatus::Loading);
        assert!(entry.error.is_none());
    }

    #[test]
    fn clear_resets_every_topic() {
        let cache = TopicCache::new();
        cache.complete("amor", vec![card("amor-001")]);
        cache.complete("familia", vec![card("familia-001")]);

        cache.clear();
        assert_eq!(cache.select_entry("amor").status, TopicStatus::Idle);
        assert_eq!(cache.select_entry("familia").status, TopicStatus::Idle);
    }
}
