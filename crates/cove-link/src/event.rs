use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LinkError;
use crate::session::Session;

/// Kind tag carried by every relay event. The set is closed; the relay
/// never emits anything else.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Request,
    Response,
    RequestCanceled,
}

/// One encrypted unit of session traffic, as fetched from the relay.
/// Ephemeral: lives for a single reconciliation pass.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    pub id: String,
    pub session_id: String,
    #[serde(rename = "eventType")]
    pub kind: EventKind,
    /// Sealed payload produced by the dapp side; opaque until opened with
    /// the session secret.
    pub ciphertext: String,
}

/// Remote store of encrypted events per session.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch events not yet acknowledged for this session.
    async fn fetch_unseen(&self, session: &Session) -> Result<Vec<RawEvent>, LinkError>;

    /// Mark one event as consumed under the session's credentials.
    async fn mark_seen(&self, event_id: &str, session: &Session) -> Result<(), LinkError>;
}
