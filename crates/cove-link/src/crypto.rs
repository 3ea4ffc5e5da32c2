use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use hkdf::Hkdf;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::LinkError;
use crate::session::SessionSecret;

pub const ENVELOPE_VERSION: u32 = 1;
const HKDF_INFO_AEAD: &[u8] = b"cove:event-envelope:aead:v1";
const NONCE_LEN: usize = 12;

/// Wire form of one encrypted event payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SealedEnvelope {
    pub version: u32,
    pub nonce: String,
    pub ciphertext: String,
}

/// Symmetric open/seal under a per-session secret.
///
/// The reconciliation path only ever opens; `seal` is the dapp-side half,
/// kept here for tests and link tooling. Implementations must fail with the
/// decryption error kind on a wrong secret or corrupt input, never panic.
pub trait CryptoAdapter: Send + Sync {
    fn open(
        &self,
        secret: &SessionSecret,
        aad: &str,
        ciphertext: &str,
    ) -> Result<Vec<u8>, LinkError>;

    fn seal(&self, secret: &SessionSecret, aad: &str, plaintext: &[u8]) -> Result<String, LinkError>;
}

/// Versioned sealed-envelope cipher: ChaCha20-Poly1305 under a key expanded
/// from the session secret with HKDF-SHA256. The session id binds as
/// associated data so an envelope cannot be replayed across sessions.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvelopeCipher;

impl EnvelopeCipher {
    pub fn new() -> Self {
        Self
    }

    fn derive_key(secret: &SessionSecret) -> Result<[u8; 32], LinkError> {
        let hkdf = Hkdf::<Sha256>::new(None, secret.as_bytes());
        let mut key_bytes = [0u8; 32];
        hkdf.expand(HKDF_INFO_AEAD, &mut key_bytes)
            .map_err(|err| LinkError::Decryption(format!("hkdf expand failed: {err}")))?;
        Ok(key_bytes)
    }
}

impl CryptoAdapter for EnvelopeCipher {
    fn open(
        &self,
        secret: &SessionSecret,
        aad: &str,
        ciphertext: &str,
    ) -> Result<Vec<u8>, LinkError> {
        let envelope: SealedEnvelope = serde_json::from_str(ciphertext)
            .map_err(|err| LinkError::Decryption(format!("invalid envelope: {err}")))?;
        if envelope.version != ENVELOPE_VERSION {
            return Err(LinkError::Decryption(format!(
                "unsupported envelope version {}",
                envelope.version
            )));
        }
        let nonce_bytes = BASE64_STANDARD
            .decode(envelope.nonce.as_bytes())
            .map_err(|err| LinkError::Decryption(format!("invalid nonce encoding: {err}")))?;
        if nonce_bytes.len() != NONCE_LEN {
            return Err(LinkError::Decryption("unexpected nonce length".into()));
        }
        let sealed = BASE64_STANDARD
            .decode(envelope.ciphertext.as_bytes())
            .map_err(|err| LinkError::Decryption(format!("invalid ciphertext encoding: {err}")))?;

        let key = Self::derive_key(secret)?;
        let cipher = ChaCha20Poly1305::new_from_slice(&key)
            .map_err(|err| LinkError::Decryption(format!("invalid key: {err}")))?;
        let nonce = Nonce::from_slice(&nonce_bytes);
        cipher
            .decrypt(
                nonce,
                Payload {
                    msg: &sealed,
                    aad: aad.as_bytes(),
                },
            )
            .map_err(|err| LinkError::Decryption(format!("envelope open failed: {err}")))
    }

    fn seal(
        &self,
        secret: &SessionSecret,
        aad: &str,
        plaintext: &[u8],
    ) -> Result<String, LinkError> {
        let key = Self::derive_key(secret)?;
        let cipher = ChaCha20Poly1305::new_from_slice(&key)
            .map_err(|err| LinkError::Decryption(format!("invalid key: {err}")))?;
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let sealed = cipher
            .encrypt(
                nonce,
                Payload {
                    msg: plaintext,
                    aad: aad.as_bytes(),
                },
            )
            .map_err(|err| LinkError::Decryption(format!("envelope seal failed: {err}")))?;

        let envelope = SealedEnvelope {
            version: ENVELOPE_VERSION,
            nonce: BASE64_STANDARD.encode(nonce_bytes),
            ciphertext: BASE64_STANDARD.encode(sealed),
        };
        serde_json::to_string(&envelope)
            .map_err(|err| LinkError::Decryption(format!("envelope encoding failed: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SECRET_LEN;

    fn secret(byte: u8) -> SessionSecret {
        SessionSecret::from_bytes([byte; SECRET_LEN])
    }

    #[test]
    fn seal_then_open_round_trips() {
        let cipher = EnvelopeCipher::new();
        let sealed = cipher
            .seal(&secret(1), "session-1", b"{\"hello\":true}")
            .unwrap();
        let opened = cipher.open(&secret(1), "session-1", &sealed).unwrap();
        assert_eq!(opened, b"{\"hello\":true}");
    }

    #[test]
    fn wrong_secret_fails_to_open() {
        let cipher = EnvelopeCipher::new();
        let sealed = cipher.seal(&secret(1), "session-1", b"payload").unwrap();
        let err = cipher.open(&secret(2), "session-1", &sealed).unwrap_err();
        assert!(matches!(err, LinkError::Decryption(_)));
    }

    #[test]
    fn mismatched_aad_fails_to_open() {
        let cipher = EnvelopeCipher::new();
        let sealed = cipher.seal(&secret(1), "session-1", b"payload").unwrap();
        let err = cipher.open(&secret(1), "session-2", &sealed).unwrap_err();
        assert!(matches!(err, LinkError::Decryption(_)));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let cipher = EnvelopeCipher::new();
        let sealed = cipher.seal(&secret(1), "session-1", b"payload").unwrap();
        let mut envelope: SealedEnvelope = serde_json::from_str(&sealed).unwrap();
        envelope.version = 9;
        let reencoded = serde_json::to_string(&envelope).unwrap();
        let err = cipher.open(&secret(1), "session-1", &reencoded).unwrap_err();
        assert!(matches!(err, LinkError::Decryption(_)));
    }

    #[test]
    fn garbage_ciphertext_is_rejected_not_panicking() {
        let cipher = EnvelopeCipher::new();
        for input in ["", "{}", "not json", "{\"version\":1,\"nonce\":\"!\",\"ciphertext\":\"\"}"] {
            assert!(cipher.open(&secret(1), "session-1", input).is_err());
        }
    }
}
