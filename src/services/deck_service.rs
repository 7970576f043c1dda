use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::BroadcastStream;
use tracing::debug;

use crate::{
    dao::card_store::WatchEvent,
    dto::{deck::DeckViewModel, events::DeckChanged},
    error::ServiceError,
    services::topic_service::ensure_authenticated,
    state::{
        SharedContext,
        deck::{DeckController, DeckEvent, DeckPhase},
    },
};

const UPDATE_CAPACITY: usize = 16;

/// Handle owning one live deck instance.
///
/// The underlying card watch is held by the forwarding task; dropping the
/// handle aborts the task, which releases the watch exactly once. The handle
/// is therefore the scoped resource the deck screen acquires on mount and
/// drops on unmount.
#[derive(Debug)]
pub struct DeckHandle {
    deck: Arc<RwLock<DeckController>>,
    updates: broadcast::Sender<DeckChanged>,
    task: JoinHandle<()>,
}

impl DeckHandle {
    /// Presentation snapshot of the deck.
    pub async fn view(&self) -> DeckViewModel {
        DeckViewModel::from(&*self.deck.read().await)
    }

    /// Permute the deck into a fresh random order and restart progress.
    pub async fn shuffle(&self) {
        self.apply(DeckEvent::Shuffle).await;
    }

    /// Record that the card on top was dismissed.
    pub async fn card_dismissed(&self) {
        self.apply(DeckEvent::CardDismissed).await;
    }

    /// Subscribe to deck refresh notifications.
    pub fn updates(&self) -> broadcast::Receiver<DeckChanged> {
        self.updates.subscribe()
    }

    /// Subscribe to deck refresh notifications as a stream.
    pub fn update_stream(&self) -> BroadcastStream<DeckChanged> {
        BroadcastStream::new(self.updates.subscribe())
    }

    async fn apply(&self, event: DeckEvent) {
        let mut deck = self.deck.write().await;
        deck.apply(event);
        notify(&self.updates, &deck);
    }
}

impl Drop for DeckHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn notify(sender: &broadcast::Sender<DeckChanged>, deck: &DeckController) {
    let current_index = match deck.phase() {
        DeckPhase::Active(active) => active.current_index(),
        _ => 0,
    };
    let _ = sender.send(DeckChanged {
        generation: deck.generation(),
        current_index,
    });
}

/// Open the live deck for a topic.
///
/// Acquires a card watch, spawns the task that applies every watch event to
/// the deck state machine, and returns the scoped handle. The deck starts in
/// the loading phase until the initial snapshot arrives.
pub async fn open_deck(ctx: &SharedContext, topic_id: &str) -> Result<DeckHandle, ServiceError> {
    ensure_authenticated(ctx)?;
    if topic_id.trim().is_empty() {
        return Err(ServiceError::InvalidInput("topic id must not be empty".into()));
    }

    let mut watch = ctx.card_store().watch_cards(topic_id).await?;

    let deck = Arc::new(RwLock::new(DeckController::new()));
    let (updates, _receiver) = broadcast::channel(UPDATE_CAPACITY);

    let task_deck = deck.clone();
    let task_updates = updates.clone();
    let topic = topic_id.to_owned();

    let task = tokio::spawn(async move {
        while let Some(event) = watch.next_event().await {
            let deck_event = match event {
                WatchEvent::Snapshot(cards) => DeckEvent::SnapshotArrived(cards),
                WatchEvent::Lost(message) => DeckEvent::WatchLost(message),
            };

            let mut guard = task_deck.write().await;
            guard.apply(deck_event);
            notify(&task_updates, &guard);
        }
        debug!(topic = %topic, "deck watch ended");
    });

    Ok(DeckHandle {
        deck,
        updates,
        task,
    })
}
