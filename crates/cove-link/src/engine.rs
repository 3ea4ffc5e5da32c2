use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::cancel::resolve_cancellations;
use crate::crypto::CryptoAdapter;
use crate::decoder::decode_event;
use crate::event::{EventSource, RawEvent};
use crate::metadata::DappMetadataStore;
use crate::request::{HostRequest, HostRequestId};
use crate::session::{Session, SessionStore};

/// Orchestrates one reconciliation pass per call: fetch, open, decode, fold
/// cancellations, acknowledge consumed events.
///
/// The engine owns no state across passes; everything it needs arrives
/// through the session argument and the collaborator handles, so an
/// abandoned pass cannot corrupt a later one.
#[derive(Clone)]
pub struct ReconciliationEngine {
    sessions: Arc<dyn SessionStore>,
    events: Arc<dyn EventSource>,
    cipher: Arc<dyn CryptoAdapter>,
    metadata: Arc<dyn DappMetadataStore>,
}

impl ReconciliationEngine {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        events: Arc<dyn EventSource>,
        cipher: Arc<dyn CryptoAdapter>,
        metadata: Arc<dyn DappMetadataStore>,
    ) -> Self {
        Self {
            sessions,
            events,
            cipher,
            metadata,
        }
    }

    /// Everything the dapp currently asks of this session, with
    /// cancellations already folded in, in original event order.
    ///
    /// Fails soft: transport trouble reads as "nothing pending" so polling
    /// loops keep running through connectivity loss. Undecryptable or
    /// unparseable events are dropped individually.
    pub async fn pending_requests(&self, session: &Session) -> Vec<HostRequest> {
        let raw = match self.events.fetch_unseen(session).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(
                    session_id = %session.id,
                    error = %err,
                    "event fetch failed, reporting no pending requests"
                );
                return Vec::new();
            }
        };

        // One concurrent open+decode task per event; join_all keeps the
        // results in fetch order for the resolution sweep.
        let decoded = join_all(
            raw.iter()
                .map(|event| self.open_and_decode(event, session)),
        )
        .await;
        let decoded: Vec<HostRequest> = decoded.into_iter().flatten().collect();

        let resolution = resolve_cancellations(decoded);
        self.acknowledge_consumed(resolution.consumed).await;
        resolution.pending
    }

    async fn open_and_decode(&self, event: &RawEvent, session: &Session) -> Option<HostRequest> {
        if event.session_id != session.id {
            debug!(event_id = %event.id, "dropping event addressed to another session");
            return None;
        }
        let plaintext = match self
            .cipher
            .open(&session.secret, &session.id, &event.ciphertext)
        {
            Ok(plaintext) => plaintext,
            Err(err) => {
                debug!(event_id = %event.id, error = %err, "dropping undecryptable event");
                return None;
            }
        };
        decode_event(
            &plaintext,
            event.kind,
            &event.id,
            session,
            self.metadata.as_ref(),
        )
        .await
    }

    /// Acknowledge every event the resolution sweep consumed. Each call runs
    /// in its own spawned task with its result discarded, so a caller that
    /// abandons the pass leaves in-flight acknowledgments to complete or
    /// fail on their own; the handles are still joined here so a finished
    /// pass reflects a settled batch.
    async fn acknowledge_consumed(&self, consumed: Vec<HostRequestId>) {
        let handles: Vec<_> = consumed
            .into_iter()
            .map(|id| {
                let engine = self.clone();
                tokio::spawn(async move { engine.mark_as_seen(&id).await })
            })
            .collect();
        for handle in handles {
            let _ = handle.await;
        }
    }

    /// Best-effort acknowledgment of one consumed event.
    ///
    /// A session unlinked since the event was decoded is a successful no-op;
    /// a failed remote call is logged and dropped rather than propagated.
    /// Re-delivery on a later poll is the accepted fallback.
    pub async fn mark_as_seen(&self, id: &HostRequestId) {
        let session = match self
            .sessions
            .lookup(&id.session_id, &id.server_url)
            .await
        {
            Some(session) => session,
            None => {
                debug!(
                    session_id = %id.session_id,
                    event_id = %id.event_id,
                    "session gone before acknowledgment, nothing to do"
                );
                return;
            }
        };
        if let Err(err) = self.events.mark_seen(&id.event_id, &session).await {
            warn!(
                session_id = %id.session_id,
                event_id = %id.event_id,
                error = %err,
                "acknowledgment failed, event may be re-delivered"
            );
        }
    }
}
