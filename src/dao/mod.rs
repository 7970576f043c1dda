/// Card store backends and the live-watch subscription types.
pub mod card_store;
/// Canonical card model and record normalization.
pub mod models;
/// Storage abstraction error shared by every backend.
pub mod storage;
