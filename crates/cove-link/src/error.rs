use thiserror::Error;

/// Error taxonomy for the reconciliation core.
///
/// None of these are fatal to the embedding application: decryption and
/// parse failures drop the offending event, a missing session turns an
/// acknowledgment into a no-op, and transport or acknowledgment failures
/// degrade to re-delivery on a later poll.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("unparseable payload: {0}")]
    UnparseablePayload(String),

    #[error("session {session_id} not found at {server_url}")]
    SessionNotFound {
        session_id: String,
        server_url: String,
    },

    #[error("acknowledgment failed: {0}")]
    Acknowledgment(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("invalid session secret: {0}")]
    InvalidSecret(String),
}
