//! Client-side data-synchronization and deck-state engine for the Fluir
//! conversation-card application.
//!
//! The crate owns four concerns: the card repository client (`dao`), the
//! session-scoped topic cache, the deck state machine (`state`), and the
//! identity gate with its navigation signalling (`services`). UI rendering,
//! gesture handling, and the identity provider protocol stay outside.

pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod services;
pub mod state;
