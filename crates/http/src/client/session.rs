//! Session lifecycle signal
//!
//! Replaces a hard redirect to the login page: when the client gives up on the
//! stored credentials it publishes [`SessionEvent::Expired`] and the
//! application shell decides how to bring the user back to a sign-in flow.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 16;

/// Session lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Stored credentials were dropped and the user has to sign in again
    Expired,
}

/// Broadcast handle for [`SessionEvent`]s
///
/// A latch keeps a cluster of failing requests from publishing more than one
/// `Expired` event. Storing a new session re-arms it.
#[derive(Clone)]
pub struct SessionSignal {
    sender: broadcast::Sender<SessionEvent>,
    expired: Arc<AtomicBool>,
}

impl SessionSignal {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            expired: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Receive future session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Whether an `Expired` event was published since the last session started
    pub fn is_expired(&self) -> bool {
        self.expired.load(Ordering::SeqCst)
    }

    /// Publish `Expired` unless it was already published for this session.
    /// Returns whether an event went out.
    pub(crate) fn expire(&self) -> bool {
        if self.expired.swap(true, Ordering::SeqCst) {
            return false;
        }
        // No subscribers is fine
        let _ = self.sender.send(SessionEvent::Expired);
        true
    }

    /// Re-arm the latch after new credentials were stored
    pub(crate) fn revive(&self) {
        self.expired.store(false, Ordering::SeqCst);
    }
}

impl Default for SessionSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSignal")
            .field("expired", &self.is_expired())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_expire_publishes_once() {
        let signal = SessionSignal::new();
        let mut events = signal.subscribe();

        assert!(signal.expire());
        assert!(!signal.expire());
        assert!(signal.is_expired());

        assert_eq!(events.recv().await.unwrap(), SessionEvent::Expired);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_revive_rearms() {
        let signal = SessionSignal::new();
        let mut events = signal.subscribe();

        signal.expire();
        signal.revive();
        assert!(!signal.is_expired());
        assert!(signal.expire());

        assert_eq!(events.recv().await.unwrap(), SessionEvent::Expired);
        assert_eq!(events.recv().await.unwrap(), SessionEvent::Expired);
    }

    #[test]
    fn test_expire_without_subscribers() {
        let signal = SessionSignal::new();
        assert!(signal.expire());
    }
}
