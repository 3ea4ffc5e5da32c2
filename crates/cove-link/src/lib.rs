//! Client-side reconciliation core for session-linked wallet traffic.
//!
//! A wallet embeds a [`ReconciliationEngine`] and polls
//! [`ReconciliationEngine::pending_requests`] per linked session. Each pass
//! fetches the session's unseen encrypted events from the relay, opens them
//! with the session secret, decodes them into typed [`HostRequest`]s, folds
//! dapp cancellations into the batch, and acknowledges consumed events
//! best-effort. No failure in a pass is fatal to the embedding application.
//!
//! The four collaborators (event source, session store, crypto adapter,
//! dapp metadata store) are traits; `cove-relay` ships the HTTP event
//! source, and the in-memory store implementations here back tests and
//! embedding hosts.

pub mod cancel;
pub mod crypto;
pub mod decoder;
pub mod error;
pub mod event;
pub mod metadata;
pub mod numeric;
pub mod request;
pub mod session;
pub mod watch;
pub mod wire;

mod engine;

pub use crypto::{CryptoAdapter, EnvelopeCipher, SealedEnvelope};
pub use engine::ReconciliationEngine;
pub use error::LinkError;
pub use event::{EventKind, EventSource, RawEvent};
pub use metadata::{DappMetadata, DappMetadataStore, InMemoryMetadataStore};
pub use request::{HostRequest, HostRequestId, RequestMethod};
pub use session::{InMemorySessionStore, Session, SessionSecret, SessionStore, SECRET_LEN};
pub use watch::{SessionChange, SessionWatch};
