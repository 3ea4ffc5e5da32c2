use tokio::sync::broadcast;

use crate::session::Session;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Clone, Debug)]
pub enum SessionChange {
    Linked(Session),
    Unlinked {
        session_id: String,
        server_url: String,
    },
}

/// Broadcast registry for session-set changes.
///
/// Listeners subscribe for a receiver and see every change published after
/// that point; dropping the receiver unsubscribes. Publishing with no live
/// subscribers is not an error.
#[derive(Debug)]
pub struct SessionWatch {
    tx: broadcast::Sender<SessionChange>,
}

impl SessionWatch {
    pub fn new() -> Self {
        Self {
            tx: broadcast::channel(CHANNEL_CAPACITY).0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.tx.subscribe()
    }

    pub fn publish(&self, change: SessionChange) {
        let _ = self.tx.send(change);
    }
}

impl Default for SessionWatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionSecret, SECRET_LEN};

    #[tokio::test]
    async fn subscribers_see_changes_in_order() {
        let watch = SessionWatch::new();
        let mut rx = watch.subscribe();

        let session = Session {
            id: "s1".to_string(),
            secret: SessionSecret::from_bytes([1u8; SECRET_LEN]),
            server_url: "https://relay.example".to_string(),
        };
        watch.publish(SessionChange::Linked(session));
        watch.publish(SessionChange::Unlinked {
            session_id: "s1".to_string(),
            server_url: "https://relay.example".to_string(),
        });

        match rx.recv().await.expect("linked change") {
            SessionChange::Linked(session) => assert_eq!(session.id, "s1"),
            other => panic!("unexpected change: {other:?}"),
        }
        match rx.recv().await.expect("unlinked change") {
            SessionChange::Unlinked { session_id, .. } => assert_eq!(session_id, "s1"),
            other => panic!("unexpected change: {other:?}"),
        }
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        let watch = SessionWatch::new();
        watch.publish(SessionChange::Unlinked {
            session_id: "gone".to_string(),
            server_url: "https://relay.example".to_string(),
        });
    }
}
