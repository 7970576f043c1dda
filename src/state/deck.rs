use rand::seq::SliceRandom;

use crate::dao::models::Card;

/// Display phase of one deck instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckPhase {
    /// Waiting for the first data arrival.
    Loading,
    /// The watch or fetch failed; recoverable only by a fresh snapshot.
    Failed {
        /// User-safe description of the failure.
        message: String,
    },
    /// Data arrived but the topic has zero cards.
    Empty,
    /// At least one card is available for presentation.
    Active(ActiveDeck),
}

/// Card sequence and progress while the deck is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDeck {
    source_cards: Vec<Card>,
    deck_cards: Vec<Card>,
    current_index: usize,
}

impl ActiveDeck {
    /// Cards in their current presentation order.
    pub fn deck_cards(&self) -> &[Card] {
        &self.deck_cards
    }

    /// Cards in the canonical order they were loaded in.
    pub fn source_cards(&self) -> &[Card] {
        &self.source_cards
    }

    /// Number of cards already dismissed.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Number of cards still to present.
    pub fn remaining(&self) -> usize {
        self.deck_cards.len() - self.current_index
    }

    /// Whether every card has been dismissed.
    pub fn is_complete(&self) -> bool {
        self.current_index == self.deck_cards.len()
    }
}

/// Events that can be applied to a deck instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckEvent {
    /// A full card snapshot arrived from the repository.
    SnapshotArrived(Vec<Card>),
    /// The live watch reported a failure and ended.
    WatchLost(String),
    /// The user dismissed the card currently on top.
    CardDismissed,
    /// The user asked for a random presentation order.
    Shuffle,
}

/// State machine turning a canonical card sequence into a navigable deck.
///
/// The controller never errors: degraded input becomes the `Empty` or
/// `Failed` display phase, and events that make no sense in the current
/// phase are ignored.
#[derive(Debug, Clone)]
pub struct DeckController {
    phase: DeckPhase,
    generation: u64,
}

impl Default for DeckController {
    fn default() -> Self {
        Self {
            phase: DeckPhase::Loading,
            generation: 0,
        }
    }
}

impl DeckController {
    /// Create a controller waiting for its first data arrival.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> &DeckPhase {
        &self.phase
    }

    /// Counter bumped whenever the presentation order changes, so the
    /// presentation layer discards in-progress gesture state.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply one event, mutating the deck in place.
    pub fn apply(&mut self, event: DeckEvent) {
        match event {
            DeckEvent::SnapshotArrived(cards) => {
                self.phase = if cards.is_empty() {
                    DeckPhase::Empty
                } else {
                    DeckPhase::Active(ActiveDeck {
                        source_cards: cards.clone(),
                        deck_cards: cards,
                        current_index: 0,
                    })
                };
                self.generation += 1;
            }
            DeckEvent::WatchLost(message) => {
                self.phase = DeckPhase::Failed { message };
            }
            DeckEvent::CardDismissed => {
                if let DeckPhase::Active(deck) = &mut self.phase
                    && deck.current_index < deck.deck_cards.len()
                {
                    deck.current_index += 1;
                }
            }
            DeckEvent::Shuffle => {
                if let DeckPhase::Active(deck) = &mut self.phase {
                    let mut shuffled = deck.source_cards.clone();
                    if shuffled.len() > 1 {
                        let mut rng = rand::rng();
                        shuffled.shuffle(&mut rng);
                    }
                    deck.deck_cards = shuffled;
                    deck.current_index = 0;
                    self.generation += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::{Card, CardRecord};

    fn card(id: &str, order: i64) -> Card {
        Card::from_record(
            id,
            CardRecord {
                prompt: Some(format!("carta {id}")),
                order: Some(order),
                ..CardRecord::default()
            },
        )
    }

    fn amor_cards() -> Vec<Card> {
        (1..=5).map(|n| card(&format!("amor-00{n}"), n - 1)).collect()
    }

    fn active(controller: &DeckController) -> &ActiveDeck {
        match controller.phase() {
            DeckPhase::Active(deck) => deck,
            other => panic!("expected active deck, got {other:?}"),
        }
    }

    fn sorted_ids(cards: &[Card]) -> Vec<String> {
        let mut ids: Vec<String> = cards.iter().map(|card| card.id.clone()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn initial_phase_is_loading() {
        let controller = DeckController::new();
        assert_eq!(*controller.phase(), DeckPhase::Loading);
        assert_eq!(controller.generation(), 0);
    }

    #[test]
    fn empty_snapshot_reaches_empty() {
        let mut controller = DeckController::new();
        controller.apply(DeckEvent::SnapshotArrived(Vec::new()));
        assert_eq!(*controller.phase(), DeckPhase::Empty);
    }

    #[test]
    fn populated_snapshot_activates_in_canonical_order() {
        let mut controller = DeckController::new();
        controller.apply(DeckEvent::SnapshotArrived(amor_cards()));

        let deck = active(&controller);
        let ids: Vec<&str> = deck.deck_cards().iter().map(|card| card.id.as_str()).collect();
        assert_eq!(ids, vec!["amor-001", "amor-002", "amor-003", "amor-004", "amor-005"]);
        assert_eq!(deck.current_index(), 0);
    }

    #[test]
    fn dismissing_all_cards_completes_and_further_dismissals_are_noops() {
        let mut controller = DeckController::new();
        controller.apply(DeckEvent::SnapshotArrived(amor_cards()));

        for expected in 1..=5 {
            controller.apply(DeckEvent::CardDismissed);
            assert_eq!(active(&controller).current_index(), expected);
        }
        assert!(active(&controller).is_complete());

        controller.apply(DeckEvent::CardDismissed);
        assert_eq!(active(&controller).current_index(), 5);
    }

    #[test]
    fn shuffle_is_a_permutation_and_resets_progress() {
        let mut controller = DeckController::new();
        controller.apply(DeckEvent::SnapshotArrived(amor_cards()));
        controller.apply(DeckEvent::CardDismissed);
        controller.apply(DeckEvent::CardDismissed);
        let generation_before = controller.generation();

        controller.apply(DeckEvent::Shuffle);

        let deck = active(&controller);
        assert_eq!(sorted_ids(deck.deck_cards()), sorted_ids(deck.source_cards()));
        assert_eq!(deck.current_index(), 0);
        assert_eq!(controller.generation(), generation_before + 1);
    }

    #[test]
    fn shuffle_outside_active_is_a_noop() {
        let mut controller = DeckController::new();
        controller.apply(DeckEvent::Shuffle);
        assert_eq!(*controller.phase(), DeckPhase::Loading);
        assert_eq!(controller.generation(), 0);

        controller.apply(DeckEvent::SnapshotArrived(Vec::new()));
        let generation = controller.generation();
        controller.apply(DeckEvent::Shuffle);
        assert_eq!(*controller.phase(), DeckPhase::Empty);
        assert_eq!(controller.generation(), generation);
    }

    #[test]
    fn fresh_snapshot_while_active_discards_progress() {
        let mut controller = DeckController::new();
        controller.apply(DeckEvent::SnapshotArrived(amor_cards()));
        controller.apply(DeckEvent::CardDismissed);
        let generation_before = controller.generation();

        let replacement = vec![card("amor-101", 0), card("amor-102", 1)];
        controller.apply(DeckEvent::SnapshotArrived(replacement));

        let deck = active(&controller);
        assert_eq!(deck.deck_cards().len(), 2);
        assert_eq!(deck.current_index(), 0);
        assert_eq!(controller.generation(), generation_before + 1);
    }

    #[test]
    fn watch_loss_fails_and_a_snapshot_recovers() {
        let mut controller = DeckController::new();
        controller.apply(DeckEvent::WatchLost("sin conexión".into()));
        assert_eq!(
            *controller.phase(),
            DeckPhase::Failed {
                message: "sin conexión".into()
            }
        );

        controller.apply(DeckEvent::SnapshotArrived(amor_cards()));
        assert_eq!(active(&controller).deck_cards().len(), 5);
    }

    #[test]
    fn dismissal_outside_active_is_ignored() {
        let mut controller = DeckController::new();
        controller.apply(DeckEvent::CardDismissed);
        assert_eq!(*controller.phase(), DeckPhase::Loading);
    }

    #[test]
    fn index_never_exceeds_deck_length_under_event_storms() {
        let mut controller = DeckController::new();
        controller.apply(DeckEvent::SnapshotArrived(amor_cards()));

        for _ in 0..20 {
            controller.apply(DeckEvent::CardDismissed);
            let deck = active(&controller);
            assert!(deck.current_index() <= deck.deck_cards().len());
        }
    }
}
