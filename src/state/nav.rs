use tokio::sync::broadcast;

use crate::dto::events::NavSignal;

/// Broadcast hub pushing navigation signals to the UI layer.
pub struct NavHub {
    sender: broadcast::Sender<NavSignal>,
}

impl NavHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent signals.
    pub fn subscribe(&self) -> broadcast::Receiver<NavSignal> {
        self.sender.subscribe()
    }

    /// Send a signal to all current subscribers, ignoring delivery errors.
    pub fn signal(&self, signal: NavSignal) {
        let _ = self.sender.send(signal);
    }
}
