//! HTTP event source for the cove relay server.
//!
//! Thin reqwest client over the relay's JSON API: fetch a session's unseen
//! events, mark one seen. Requests authenticate with the session id and a
//! digest of the session secret; the raw secret never goes on the wire.

pub mod wire;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;
use url::Url;

use cove_link::{EventSource, LinkError, RawEvent, Session, SessionSecret};

use crate::wire::EventsResponse;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status: {status} body={body}")]
    UnexpectedStatus { status: StatusCode, body: String },
    #[error("invalid relay url: {0}")]
    InvalidUrl(String),
}

/// Digest the relay accepts as the session's credential.
fn auth_token(secret: &SessionSecret) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Wire-level backend, split out so tests can run without a server.
#[async_trait]
trait RelayBackend: Send + Sync {
    async fn get_events(
        &self,
        url: Url,
        session_id: &str,
        token: &str,
    ) -> Result<EventsResponse, RelayError>;

    async fn post_seen(&self, url: Url, session_id: &str, token: &str) -> Result<(), RelayError>;
}

struct ReqwestRelayBackend {
    http: reqwest::Client,
}

impl ReqwestRelayBackend {
    fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    async fn expect_success<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, RelayError> {
        if response.status().is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(RelayError::UnexpectedStatus { status, body })
        }
    }
}

#[async_trait]
impl RelayBackend for ReqwestRelayBackend {
    async fn get_events(
        &self,
        url: Url,
        session_id: &str,
        token: &str,
    ) -> Result<EventsResponse, RelayError> {
        let response = self
            .http
            .get(url)
            .basic_auth(session_id, Some(token))
            .send()
            .await?;
        Self::expect_success(response).await
    }

    async fn post_seen(&self, url: Url, session_id: &str, token: &str) -> Result<(), RelayError> {
        let response = self
            .http
            .post(url)
            .basic_auth(session_id, Some(token))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(RelayError::UnexpectedStatus { status, body })
        }
    }
}

/// Client for one relay server. Cheap to clone; sessions pointing at other
/// servers need their own client.
#[derive(Clone)]
pub struct RelayClient {
    base_url: Url,
    backend: Arc<dyn RelayBackend>,
}

impl RelayClient {
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, RelayError> {
        let mut base = base_url.as_ref().trim().to_string();
        if base.is_empty() {
            return Err(RelayError::InvalidUrl("relay url cannot be empty".into()));
        }
        if !base.starts_with("http://") && !base.starts_with("https://") {
            base = format!("https://{base}");
        }
        let parsed =
            Url::parse(&base).map_err(|err| RelayError::InvalidUrl(format!("{base}: {err}")))?;
        Ok(Self {
            base_url: parsed,
            backend: Arc::new(ReqwestRelayBackend::new()),
        })
    }

    #[cfg(test)]
    fn with_backend(base_url: &str, backend: Arc<dyn RelayBackend>) -> Self {
        Self {
            base_url: Url::parse(base_url).expect("test base url"),
            backend,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn events_url(&self, session_id: &str) -> Result<Url, RelayError> {
        let mut url = self
            .base_url
            .join(&format!("sessions/{session_id}/events"))
            .map_err(|err| RelayError::InvalidUrl(err.to_string()))?;
        url.set_query(Some("unseenOnly=true"));
        Ok(url)
    }

    fn seen_url(&self, session_id: &str, event_id: &str) -> Result<Url, RelayError> {
        self.base_url
            .join(&format!("sessions/{session_id}/events/{event_id}/seen"))
            .map_err(|err| RelayError::InvalidUrl(err.to_string()))
    }
}

#[async_trait]
impl EventSource for RelayClient {
    async fn fetch_unseen(&self, session: &Session) -> Result<Vec<RawEvent>, LinkError> {
        let url = self
            .events_url(&session.id)
            .map_err(|err| LinkError::Transport(err.to_string()))?;
        let token = auth_token(&session.secret);
        let response = self
            .backend
            .get_events(url, &session.id, &token)
            .await
            .map_err(|err| LinkError::Transport(err.to_string()))?;
        debug!(session_id = %session.id, count = response.events.len(), "fetched unseen events");
        Ok(response
            .events
            .into_iter()
            .map(|event| RawEvent {
                id: event.id,
                session_id: session.id.clone(),
                kind: event.event_type,
                ciphertext: event.data,
            })
            .collect())
    }

    async fn mark_seen(&self, event_id: &str, session: &Session) -> Result<(), LinkError> {
        let url = self
            .seen_url(&session.id, event_id)
            .map_err(|err| LinkError::Acknowledgment(err.to_string()))?;
        let token = auth_token(&session.secret);
        self.backend
            .post_seen(url, &session.id, &token)
            .await
            .map_err(|err| LinkError::Acknowledgment(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::WireEvent;
    use cove_link::{EventKind, SECRET_LEN};
    use parking_lot::Mutex;

    fn session() -> Session {
        Session {
            id: "s1".to_string(),
            secret: SessionSecret::from_bytes([9u8; SECRET_LEN]),
            server_url: "https://relay.example".to_string(),
        }
    }

    struct RecordingBackend {
        events: Vec<WireEvent>,
        fail: bool,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingBackend {
        fn new(events: Vec<WireEvent>) -> Self {
            Self {
                events,
                fail: false,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RelayBackend for RecordingBackend {
        async fn get_events(
            &self,
            url: Url,
            _session_id: &str,
            _token: &str,
        ) -> Result<EventsResponse, RelayError> {
            self.calls.lock().push(format!("GET {url}"));
            if self.fail {
                return Err(RelayError::UnexpectedStatus {
                    status: StatusCode::UNAUTHORIZED,
                    body: "bad credentials".to_string(),
                });
            }
            Ok(EventsResponse {
                events: self.events.clone(),
            })
        }

        async fn post_seen(
            &self,
            url: Url,
            _session_id: &str,
            _token: &str,
        ) -> Result<(), RelayError> {
            self.calls.lock().push(format!("POST {url}"));
            if self.fail {
                return Err(RelayError::UnexpectedStatus {
                    status: StatusCode::NOT_FOUND,
                    body: String::new(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn auth_token_is_a_secret_digest_not_the_secret() {
        let token = auth_token(&session().secret);
        assert_eq!(token.len(), 64);
        assert_ne!(token, "09".repeat(SECRET_LEN));
    }

    #[tokio::test]
    async fn fetch_maps_wire_events_to_raw_events() {
        let backend = Arc::new(RecordingBackend::new(vec![WireEvent {
            id: "e1".to_string(),
            event_type: EventKind::Request,
            data: "sealed".to_string(),
        }]));
        let client = RelayClient::with_backend("https://relay.example/", backend.clone());

        let raw = client.fetch_unseen(&session()).await.unwrap();

        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].id, "e1");
        assert_eq!(raw[0].session_id, "s1");
        assert_eq!(raw[0].ciphertext, "sealed");
        assert_eq!(
            backend.calls.lock().as_slice(),
            ["GET https://relay.example/sessions/s1/events?unseenOnly=true"]
        );
    }

    #[tokio::test]
    async fn fetch_failure_maps_to_transport_error() {
        let mut backend = RecordingBackend::new(Vec::new());
        backend.fail = true;
        let client = RelayClient::with_backend("https://relay.example/", Arc::new(backend));

        let err = client.fetch_unseen(&session()).await.unwrap_err();
        assert!(matches!(err, LinkError::Transport(_)));
    }

    #[tokio::test]
    async fn mark_seen_posts_to_the_event_and_maps_failures() {
        let backend = Arc::new(RecordingBackend::new(Vec::new()));
        let client = RelayClient::with_backend("https://relay.example/", backend.clone());

        client.mark_seen("e7", &session()).await.unwrap();
        assert_eq!(
            backend.calls.lock().as_slice(),
            ["POST https://relay.example/sessions/s1/events/e7/seen"]
        );

        let mut failing = RecordingBackend::new(Vec::new());
        failing.fail = true;
        let client = RelayClient::with_backend("https://relay.example/", Arc::new(failing));
        let err = client.mark_seen("e7", &session()).await.unwrap_err();
        assert!(matches!(err, LinkError::Acknowledgment(_)));
    }

    #[test]
    fn bare_hosts_get_a_scheme() {
        let client = RelayClient::new("relay.example").unwrap();
        assert_eq!(client.base_url().as_str(), "https://relay.example/");
        assert!(RelayClient::new("").is_err());
    }
}
