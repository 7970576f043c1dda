/// Deck view model handed to the presentation layer.
pub mod deck;
/// Signals broadcast to the UI and navigation layers.
pub mod events;
/// Topic descriptors and the topic screen view model.
pub mod topic;
