use serde::Serialize;
use tokio::sync::watch;

/// Identity of the signed-in user as supplied by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    /// Stable identifier of the account.
    pub uid: String,
    /// Display name, when the provider shares one.
    pub display_name: Option<String>,
    /// Account email, when the provider shares one.
    pub email: Option<String>,
    /// Avatar URL, when the provider shares one.
    pub photo_url: Option<String>,
}

impl UserIdentity {
    /// Build an identity carrying only the uid.
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
            email: None,
            photo_url: None,
        }
    }
}

/// Identity state as observed from the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    /// The provider has not yet resolved the stored session.
    Loading,
    /// A user is signed in.
    Authenticated(UserIdentity),
    /// No user is signed in.
    Unauthenticated,
}

/// Point-in-time view of the identity state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSnapshot {
    /// Current status.
    pub status: AuthStatus,
    /// Message of the last provider failure, if any.
    pub error: Option<String>,
}

/// Event delivered by the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityEvent {
    /// The signed-in user changed; `None` means signed out.
    Changed(Option<UserIdentity>),
    /// The provider could not resolve the session.
    Failed(String),
}

/// Observable identity state, read-only outside the session gate.
pub struct AuthState {
    snapshot: watch::Sender<AuthSnapshot>,
}

impl AuthState {
    /// Start in the loading state until the provider emits.
    pub fn new() -> Self {
        let (snapshot, _rx) = watch::channel(AuthSnapshot {
            status: AuthStatus::Loading,
            error: None,
        });
        Self { snapshot }
    }

    /// Current identity snapshot.
    pub fn current(&self) -> AuthSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to identity snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.snapshot.subscribe()
    }

    /// Whether a user is currently signed in.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.snapshot.borrow().status, AuthStatus::Authenticated(_))
    }

    pub(crate) fn set_authenticated(&self, user: UserIdentity) {
        let _ = self.snapshot.send(AuthSnapshot {
            status: AuthStatus::Authenticated(user),
            error: None,
        });
    }

    pub(crate) fn set_unauthenticated(&self, error: Option<String>) {
        let _ = self.snapshot.send(AuthSnapshot {
            status: AuthStatus::Unauthenticated,
            error,
        });
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::new()
    }
}
