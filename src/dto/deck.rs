use serde::Serialize;

use crate::dao::models::Card;
use crate::state::deck::{DeckController, DeckPhase};

/// Coarse deck phase tag carried by the view model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeckPhaseTag {
    /// Waiting for the first data arrival.
    Loading,
    /// The watch failed; the screen offers a retry.
    Error,
    /// The topic has zero cards.
    Empty,
    /// Cards are available for presentation.
    Active,
}

/// Presentation snapshot of one deck instance.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeckViewModel {
    /// Current display phase.
    pub phase: DeckPhaseTag,
    /// Cards in presentation order; empty outside the active phase.
    pub deck_cards: Vec<Card>,
    /// Number of cards already dismissed.
    pub current_index: usize,
    /// Cards still to present.
    pub remaining: usize,
    /// Whether every card has been dismissed.
    pub complete: bool,
    /// Bumped whenever the presentation order changes.
    pub generation: u64,
    /// User-safe message when the phase is `Error`.
    pub error: Option<String>,
}

impl From<&DeckController> for DeckViewModel {
    fn from(controller: &DeckController) -> Self {
        let generation = controller.generation();
        match controller.phase() {
            DeckPhase::Loading => Self {
                phase: DeckPhaseTag::Loading,
                deck_cards: Vec::new(),
                current_index: 0,
                remaining: 0,
                complete: false,
                generation,
                error: None,
            },
            DeckPhase::Failed { message } => Self {
                phase: DeckPhaseTag::Error,
                deck_cards: Vec::new(),
                current_index: 0,
                remaining: 0,
                complete: false,
                generation,
                error: Some(message.clone()),
            },
            DeckPhase::Empty => Self {
                phase: DeckPhaseTag::Empty,
                deck_cards: Vec::new(),
                current_index: 0,
                remaining: 0,
                complete: false,
                generation,
                error: None,
            },
            DeckPhase::Active(deck) => Self {
                phase: DeckPhaseTag::Active,
                deck_cards: deck.deck_cards().to_vec(),
                current_index: deck.current_index(),
                remaining: deck.remaining(),
                complete: deck.is_complete(),
                generation,
                error: None,
            },
        }
    }
}
