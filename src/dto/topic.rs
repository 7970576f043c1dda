use serde::{Deserialize, Serialize};

use crate::dao::models::Card;
use crate::state::{TopicEntry, TopicStatus};

/// Display metadata for a topic, supplied by the caller/navigation layer.
///
/// The repository never derives these fields; they travel with the route.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TopicDescriptor {
    /// Topic identifier used against the card repository.
    pub id: String,
    /// Heading shown on the topic screen.
    pub title: String,
    /// Short blurb shown under the heading.
    pub description: String,
    /// Background gradient color stops.
    pub gradient: Vec<String>,
    /// Accent color for highlights.
    pub accent_color: String,
    /// Optional emoji shown on the preview card.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

/// Per-topic state handed to the topic screen.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TopicViewModel {
    /// Cards in canonical order as of the last successful fetch.
    pub cards: Vec<Card>,
    /// Current load state.
    pub status: TopicStatus,
    /// User-safe message of the last failure, if any.
    pub error: Option<String>,
}

impl From<TopicEntry> for TopicViewModel {
    fn from(entry: TopicEntry) -> Self {
        Self {
            cards: entry.cards,
            status: entry.status,
            error: entry.error,
        }
    }
}

/// Mutually exclusive display states of a topic screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicDisplayState<'a> {
    /// Show the loading spinner.
    Loading,
    /// Show the error text and the retry action.
    Failed {
        /// Message to display; the screen falls back to its own copy when absent.
        message: Option<&'a str>,
    },
    /// Show the no-cards-yet text.
    Empty,
    /// Show the card list.
    List(&'a [Card]),
}

impl TopicViewModel {
    /// Collapse the entry into exactly one of the exhaustive display states.
    pub fn display_state(&self) -> TopicDisplayState<'_> {
        match self.status {
            TopicStatus::Idle | TopicStatus::Loading => TopicDisplayState::Loading,
            TopicStatus::Error => TopicDisplayState::Failed {
                message: self.error.as_deref(),
            },
            TopicStatus::Loaded if self.cards.is_empty() => TopicDisplayState::Empty,
            TopicStatus::Loaded => TopicDisplayState::List(&self.cards),
        }
    }
}
