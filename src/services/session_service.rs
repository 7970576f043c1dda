use futures::{Stream, StreamExt};
use tracing::{info, warn};

use crate::{
    dto::events::NavSignal,
    state::{AuthStatus, IdentityEvent, SharedContext},
};

/// User-safe message stored when the provider cannot validate the session.
pub const SESSION_ERROR_MESSAGE: &str = "No se pudo validar tu sesión.";

/// Observe the identity provider for the lifetime of the session.
///
/// Applies every provider event to the shared auth state. On the edge
/// transition out of an authenticated state, session data is cleared and
/// exactly one reset-to-entry signal is emitted; repeated signed-out events
/// do not repeat the signal. Sign-out itself belongs to the provider; this
/// loop only observes.
pub async fn run<S>(ctx: SharedContext, mut events: S)
where
    S: Stream<Item = IdentityEvent> + Unpin,
{
    while let Some(event) = events.next().await {
        match event {
            IdentityEvent::Changed(Some(user)) => {
                if let AuthStatus::Authenticated(previous) = ctx.auth().current().status
                    && previous.uid != user.uid
                {
                    // A different account signed in; the previous account's
                    // cards must not leak into this session.
                    info!(uid = %user.uid, "identity switched; clearing session data");
                    ctx.reset_session_data();
                }
                ctx.auth().set_authenticated(user);
            }
            IdentityEvent::Changed(None) => {
                handle_signed_out(&ctx, None);
            }
            IdentityEvent::Failed(message) => {
                warn!(error = %message, "identity provider failed to resolve the session");
                handle_signed_out(&ctx, Some(SESSION_ERROR_MESSAGE.to_owned()));
            }
        }
    }

    info!("identity event stream ended");
}

fn handle_signed_out(ctx: &SharedContext, error: Option<String>) {
    let was_authenticated = ctx.auth().is_authenticated();
    ctx.auth().set_unauthenticated(error);

    if was_authenticated {
        ctx.reset_session_data();
        ctx.nav().signal(NavSignal::ResetToEntry);
    }
}
