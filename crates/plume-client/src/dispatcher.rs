use tokio::sync::broadcast;

use plume_types::events::SessionEvent;

/// Fan-out of session lifecycle events to every subscriber (shell, screens).
#[derive(Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Broadcast to all subscribers. Nobody listening is fine.
    pub fn broadcast(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
