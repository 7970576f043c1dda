pub mod auth;
pub mod deck;
mod nav;
pub mod topics;

use std::sync::Arc;

use tracing::info;

use crate::dao::card_store::CardStore;

pub use self::auth::{AuthSnapshot, AuthState, AuthStatus, IdentityEvent, UserIdentity};
pub use self::nav::NavHub;
pub use self::topics::{TopicCache, TopicEntry, TopicStatus};

/// Shared handle to the per-session context.
pub type SharedContext = Arc<SessionContext>;

/// Default capacity of the navigation signal hub.
const NAV_CAPACITY: usize = 16;

/// Explicit per-session context passed to every consumer.
///
/// Owns the topic cache, the identity state, and the navigation hub for one
/// authenticated session. Created at session start; the session gate clears
/// the cached data when the identity is lost.
pub struct SessionContext {
    store: Arc<dyn CardStore>,
    topics: TopicCache,
    auth: AuthState,
    nav: NavHub,
}

impl SessionContext {
    /// Construct a new context wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(store: Arc<dyn CardStore>) -> SharedContext {
        Arc::new(Self {
            store,
            topics: TopicCache::new(),
            auth: AuthState::new(),
            nav: NavHub::new(NAV_CAPACITY),
        })
    }

    /// Handle to the configured card store backend.
    pub fn card_store(&self) -> Arc<dyn CardStore> {
        self.store.clone()
    }

    /// Session-scoped topic cache.
    pub fn topics(&self) -> &TopicCache {
        &self.topics
    }

    /// Observable identity state.
    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    /// Hub carrying navigation signals to the UI layer.
    pub fn nav(&self) -> &NavHub {
        &self.nav
    }

    /// Teardown hook dropping everything tied to the previous identity.
    pub fn reset_session_data(&self) {
        self.topics.clear();
        info!("session data reset");
    }
}
