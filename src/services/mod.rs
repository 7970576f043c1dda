/// Live deck subscription wiring and the deck screen handle.
pub mod deck_service;
/// Identity observation, session teardown, and navigation signalling.
pub mod session_service;
/// Cache-based topic loading for the topic screen.
pub mod topic_service;
