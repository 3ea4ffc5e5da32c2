use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use parking_lot::RwLock;
use rand::RngCore;
use uuid::Uuid;

use crate::error::LinkError;
use crate::watch::{SessionChange, SessionWatch};

pub const SECRET_LEN: usize = 32;

/// Per-session symmetric secret shared with the dapp side at link time.
///
/// The secret never appears in `Debug` output. Keep it out of log fields and
/// serialized forms; the session store is the only place it persists.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionSecret([u8; SECRET_LEN]);

impl SessionSecret {
    pub fn from_bytes(bytes: [u8; SECRET_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(encoded: &str) -> Result<Self, LinkError> {
        let raw = hex::decode(encoded.trim())
            .map_err(|err| LinkError::InvalidSecret(format!("invalid hex: {err}")))?;
        let bytes: [u8; SECRET_LEN] = raw.try_into().map_err(|raw: Vec<u8>| {
            LinkError::InvalidSecret(format!("expected {SECRET_LEN} bytes, got {}", raw.len()))
        })?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; SECRET_LEN] {
        &self.0
    }
}

impl fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionSecret(..)")
    }
}

/// One linked host/wallet pairing. Created on link, removed on unlink,
/// immutable in between.
#[derive(Clone, Debug)]
pub struct Session {
    pub id: String,
    pub secret: SessionSecret,
    pub server_url: String,
}

impl Session {
    /// Mint a fresh session for the link handshake: random id, random
    /// full-strength secret.
    pub fn generate(server_url: impl Into<String>) -> Self {
        let mut secret = [0u8; SECRET_LEN];
        rand::rngs::OsRng.fill_bytes(&mut secret);
        Self {
            id: Uuid::new_v4().to_string(),
            secret: SessionSecret::from_bytes(secret),
            server_url: server_url.into(),
        }
    }
}

/// Resolves session identities to their secrets and relay servers. Sessions
/// are keyed by (id, server url) because ids are only unique per relay.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn lookup(&self, session_id: &str, server_url: &str) -> Option<Session>;
}

/// In-memory session registry. Backs tests, and embedding hosts that load
/// their sessions from platform storage at startup.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<(String, String), Session>>,
    watch: SessionWatch,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change feed for the session set; see [`SessionWatch`].
    pub fn watch(&self) -> &SessionWatch {
        &self.watch
    }

    pub fn link(&self, session: Session) {
        let key = (session.id.clone(), session.server_url.clone());
        self.sessions.write().insert(key, session.clone());
        self.watch.publish(SessionChange::Linked(session));
    }

    pub fn unlink(&self, session_id: &str, server_url: &str) -> Option<Session> {
        let key = (session_id.to_string(), server_url.to_string());
        let removed = self.sessions.write().remove(&key);
        if removed.is_some() {
            self.watch.publish(SessionChange::Unlinked {
                session_id: session_id.to_string(),
                server_url: server_url.to_string(),
            });
        }
        removed
    }

    pub fn sessions(&self) -> Vec<Session> {
        self.sessions.read().values().cloned().collect()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn lookup(&self, session_id: &str, server_url: &str) -> Option<Session> {
        let key = (session_id.to_string(), server_url.to_string());
        self.sessions.read().get(&key).cloned()
    }
}
