use tracing::{debug, warn};

use crate::{
    dao::models::Card,
    dto::topic::TopicViewModel,
    error::ServiceError,
    state::{SharedContext, TopicEntry, TopicStatus},
};

/// User-safe message stored in the cache when a topic fetch fails.
pub const LOAD_ERROR_MESSAGE: &str = "No se pudieron cargar las cartas.";

/// Guard shared by data-loading operations: the session gate decides whether
/// repository data may be read at all.
pub(crate) fn ensure_authenticated(ctx: &SharedContext) -> Result<(), ServiceError> {
    if !ctx.auth().is_authenticated() {
        return Err(ServiceError::Unauthorized(
            "an authenticated session is required".into(),
        ));
    }
    Ok(())
}

/// Load a topic's cards through the session cache.
///
/// The entry moves to `loading` immediately, then to `loaded` or `error` once
/// the fetch settles; the outcome is both recorded in the cache and returned
/// to the caller, since some consumers read the cache passively while others
/// await the loader directly. Concurrent calls for the same topic are not
/// merged; the last one to settle determines the entry.
pub async fn request_cards(
    ctx: &SharedContext,
    topic_id: &str,
) -> Result<Vec<Card>, ServiceError> {
    ensure_authenticated(ctx)?;
    if topic_id.trim().is_empty() {
        return Err(ServiceError::InvalidInput("topic id must not be empty".into()));
    }

    ctx.topics().begin_request(topic_id);

    match ctx.card_store().fetch_cards(topic_id).await {
        Ok(cards) => {
            ctx.topics().complete(topic_id, cards.clone());
            Ok(cards)
        }
        Err(err) => {
            warn!(topic = %topic_id, error = %err, "topic fetch failed");
            ctx.topics().fail(topic_id, LOAD_ERROR_MESSAGE);
            Err(err.into())
        }
    }
}

/// Trigger a load only when the entry is idle, then return the entry.
///
/// Screen-mount policy: a failed load is reflected in the returned entry
/// rather than raised, so the screen renders the retry state.
pub async fn ensure_cards(
    ctx: &SharedContext,
    topic_id: &str,
) -> Result<TopicEntry, ServiceError> {
    ensure_authenticated(ctx)?;

    if select_entry(ctx, topic_id).status == TopicStatus::Idle {
        if let Err(err) = request_cards(ctx, topic_id).await {
            debug!(topic = %topic_id, error = %err, "initial topic load failed");
        }
    }

    Ok(select_entry(ctx, topic_id))
}

/// Pure lookup of a topic's cache entry; never mutates.
pub fn select_entry(ctx: &SharedContext, topic_id: &str) -> TopicEntry {
    ctx.topics().select_entry(topic_id)
}

/// View model handed to the topic screen.
pub fn topic_view(ctx: &SharedContext, topic_id: &str) -> TopicViewModel {
    select_entry(ctx, topic_id).into()
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use futures::future::BoxFuture;
    use tokio::sync::oneshot;
    use tokio::time::sleep;

    use super::*;
    use crate::dao::card_store::memory::MemoryCardStore;
    use crate::dao::card_store::{CardStore, CardWatch};
    use crate::dao::models::{Card, CardRecord};
    use crate::dao::storage::{RepositoryError, StoreResult};
    use crate::state::{SessionContext, SharedContext, TopicStatus, UserIdentity};

    fn record(prompt: &str, order: i64) -> CardRecord {
        CardRecord {
            prompt: Some(prompt.to_owned()),
            order: Some(order),
            ..CardRecord::default()
        }
    }

    fn signed_in(ctx: &SharedContext) {
        ctx.auth().set_authenticated(UserIdentity::new("uid-1"));
    }

    #[tokio::test]
    async fn successful_request_settles_the_entry_as_loaded() {
        let store = MemoryCardStore::new();
        store.seed_topic(
            "amor",
            vec![
                ("amor-001".into(), record("primera", 0)),
                ("amor-002".into(), record("segunda", 1)),
            ],
        );
        let ctx = SessionContext::new(Arc::new(store));
        signed_in(&ctx);

        let cards = request_cards(&ctx, "amor").await.unwrap();
        let entry = select_entry(&ctx, "amor");
        assert_eq!(entry.status, TopicStatus::Loaded);
        assert_eq!(entry.cards, cards);
        assert!(entry.error.is_none());
    }

    #[tokio::test]
    async fn failed_request_settles_the_entry_as_error_and_raises() {
        let store = MemoryCardStore::new();
        store.set_offline(true);
        let ctx = SessionContext::new(Arc::new(store));
        signed_in(&ctx);

        let err = request_cards(&ctx, "amor").await.unwrap_err();
        assert!(matches!(err, ServiceError::Repository(_)));

        let entry = select_entry(&ctx, "amor");
        assert_eq!(entry.status, TopicStatus::Error);
        assert_eq!(entry.error.as_deref(), Some(LOAD_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn unauthenticated_sessions_cannot_load_cards() {
        let ctx = SessionContext::new(Arc::new(MemoryCardStore::new()));
        let err = request_cards(&ctx, "amor").await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn blank_topic_id_is_rejected() {
        let ctx = SessionContext::new(Arc::new(MemoryCardStore::new()));
        signed_in(&ctx);
        let err = request_cards(&ctx, "  ").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn ensure_cards_only_fetches_when_idle() {
        let store = MemoryCardStore::new();
        store.seed_topic("amor", vec![("amor-001".into(), record("primera", 0))]);
        let ctx = SessionContext::new(Arc::new(store.clone()));
        signed_in(&ctx);

        let entry = ensure_cards(&ctx, "amor").await.unwrap();
        assert_eq!(entry.status, TopicStatus::Loaded);

        // A later data change must not be picked up without an explicit refetch.
        store.upsert_card("amor", "amor-002", record("segunda", 1));
        let entry = ensure_cards(&ctx, "amor").await.unwrap();
        assert_eq!(entry.cards.len(), 1);
    }

    #[tokio::test]
    async fn ensure_cards_reflects_failures_in_the_entry() {
        let store = MemoryCardStore::new();
        store.set_offline(true);
        let ctx = SessionContext::new(Arc::new(store));
        signed_in(&ctx);

        let entry = ensure_cards(&ctx, "amor").await.unwrap();
        assert_eq!(entry.status, TopicStatus::Error);
    }

    /// Store whose fetches block until released, in call order.
    struct ScriptedStore {
        slots: Mutex<VecDeque<(oneshot::Receiver<()>, Vec<Card>)>>,
        started: AtomicUsize,
    }

    impl ScriptedStore {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                slots: Mutex::new(VecDeque::new()),
                started: AtomicUsize::new(0),
            })
        }

        fn enqueue(&self, cards: Vec<Card>) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.slots.lock().unwrap().push_back((rx, cards));
            tx
        }

        async fn wait_started(&self, count: usize) {
            while self.started.load(Ordering::SeqCst) < count {
                sleep(Duration::from_millis(1)).await;
            }
        }
    }

    impl CardStore for Arc<ScriptedStore> {
        fn fetch_cards(&self, _topic_id: &str) -> BoxFuture<'static, StoreResult<Vec<Card>>> {
            let store = self.clone();
            Box::pin(async move {
                let (release, cards) = store
                    .slots
                    .lock()
                    .unwrap()
                    .pop_front()
                    .expect("unexpected fetch");
                store.started.fetch_add(1, Ordering::SeqCst);
                let _ = release.await;
                Ok(cards)
            })
        }

        fn watch_cards(&self, _topic_id: &str) -> BoxFuture<'static, StoreResult<CardWatch>> {
            unimplemented!("not used by these tests")
        }
    }

    #[tokio::test]
    async fn overlapping_requests_let_the_last_settle_win() {
        let store = ScriptedStore::new();
        let first_payload = vec![Card::from_record("familia-001", CardRecord::default())];
        let second_payload = vec![
            Card::from_record("familia-001", CardRecord::default()),
            Card::from_record("familia-002", CardRecord::default()),
        ];
        let release_first = store.enqueue(first_payload.clone());
        let release_second = store.enqueue(second_payload);

        let ctx = SessionContext::new(Arc::new(store.clone()));
        signed_in(&ctx);

        let ctx_first = ctx.clone();
        let first = tokio::spawn(async move { request_cards(&ctx_first, "familia").await });
        store.wait_started(1).await;

        let ctx_second = ctx.clone();
        let second = tokio::spawn(async move { request_cards(&ctx_second, "familia").await });
        store.wait_started(2).await;

        // The second call settles first; the first call settles last and its
        // payload overwrites the entry.
        release_second.send(()).unwrap();
        second.await.unwrap().unwrap();

        release_first.send(()).unwrap();
        first.await.unwrap().unwrap();

        let entry = select_entry(&ctx, "familia");
        assert_eq!(entry.status, TopicStatus::Loaded);
        assert_eq!(entry.cards, first_payload);
    }
}
