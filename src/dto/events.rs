use serde::Serialize;

/// Instruction broadcast to the navigation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NavSignal {
    /// Discard all protected view state and return to the entry view.
    ResetToEntry,
}

/// Notification that a deck's presentation state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckChanged {
    /// Presentation-order generation after the change.
    pub generation: u64,
    /// Dismissal progress after the change.
    pub current_index: usize,
}
