//! Envelope codec
//!
//! One payload in, one self-contained authenticated envelope out, and back.
//! The codec does not know whether it is carrying text or file bytes.
//!
//! ```text
//!   plaintext ──encrypt(key)──► Envelope { nonce(12), ciphertext ‖ tag(16) }
//!   Envelope  ──decrypt(key)──► plaintext | EnvelopeMalformed | AuthenticationFailure
//! ```
//!
//! The nonce is drawn from the OS CSPRNG inside [`encrypt`] on every call.
//! There is no API through which a caller can pass or reuse a nonce.

use crate::crypto::keys::SessionKey;
use crate::crypto::{NONCE_LENGTH, TAG_LENGTH};
use crate::error::CryptoError;
use rand::rngs::OsRng;
use rand_core::RngCore;
use serde::{Deserialize, Serialize};

/// Authenticated ciphertext unit. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(with = "serde_bytes")]
    nonce: Vec<u8>,
    /// Ciphertext with the authentication tag appended.
    #[serde(with = "serde_bytes")]
    ciphertext: Vec<u8>,
}

impl Envelope {
    /// Rebuild an envelope from bytes received over the transport.
    ///
    /// No validation happens here; [`decrypt`] reports structural problems
    /// as `EnvelopeMalformed`.
    pub fn from_parts(nonce: Vec<u8>, sealed: Vec<u8>) -> Self {
        Self {
            nonce,
            ciphertext: sealed,
        }
    }

    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    /// Ciphertext body without the tag.
    pub fn ciphertext(&self) -> &[u8] {
        let split = self.ciphertext.len().saturating_sub(TAG_LENGTH);
        &self.ciphertext[..split]
    }

    /// Authentication tag (may be short on a malformed envelope).
    pub fn tag(&self) -> &[u8] {
        let split = self.ciphertext.len().saturating_sub(TAG_LENGTH);
        &self.ciphertext[split..]
    }

    /// Ciphertext ‖ tag, as fed to the AEAD.
    pub fn sealed(&self) -> &[u8] {
        &self.ciphertext
    }

    fn validate(&self) -> Result<&[u8; NONCE_LENGTH], CryptoError> {
        let nonce: &[u8; NONCE_LENGTH] = self.nonce.as_slice().try_into().map_err(|_| {
            CryptoError::EnvelopeMalformed(format!(
                "nonce must be {} bytes, got {}",
                NONCE_LENGTH,
                self.nonce.len()
            ))
        })?;

        if self.ciphertext.is_empty() {
            return Err(CryptoError::EnvelopeMalformed(
                "ciphertext is empty".to_string(),
            ));
        }

        if self.ciphertext.len() < TAG_LENGTH {
            return Err(CryptoError::EnvelopeMalformed(format!(
                "tag must be {} bytes, got {}",
                TAG_LENGTH,
                self.ciphertext.len()
            )));
        }

        Ok(nonce)
    }
}

/// Encrypt `plaintext` under `key` with a fresh random nonce and empty AAD.
///
/// # Errors
///
/// - `RandomnessFailure` if no nonce could be drawn (fatal)
/// - `AeadEncryptionError` only for inputs beyond the cipher's limits
pub fn encrypt(plaintext: &[u8], key: &SessionKey) -> Result<Envelope, CryptoError> {
    let mut nonce = [0u8; NONCE_LENGTH];
    OsRng.try_fill_bytes(&mut nonce)?;

    let sealed = key.suite().seal(key.as_bytes(), &nonce, plaintext)?;

    Ok(Envelope {
        nonce: nonce.to_vec(),
        ciphertext: sealed,
    })
}

/// Verify and decrypt an envelope.
///
/// Structural checks run first, then the tag is verified before any
/// plaintext is released. Pure: safe to call concurrently.
pub fn decrypt(envelope: &Envelope, key: &SessionKey) -> Result<Vec<u8>, CryptoError> {
    let nonce = envelope.validate()?;
    key.suite().open(key.as_bytes(), nonce, &envelope.ciphertext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::suites::CipherSuite;

    fn key() -> SessionKey {
        SessionKey::generate(CipherSuite::Aes256Gcm).unwrap()
    }

    #[test]
    fn test_envelope_layout() {
        let key = key();
        let envelope = encrypt(b"hello", &key).unwrap();

        assert_eq!(envelope.nonce().len(), NONCE_LENGTH);
        assert_eq!(envelope.tag().len(), TAG_LENGTH);
        assert_eq!(envelope.ciphertext().len(), 5);
        assert_ne!(envelope.ciphertext(), b"hello");
    }

    #[test]
    fn test_empty_plaintext_round_trips() {
        let key = key();
        let envelope = encrypt(b"", &key).unwrap();
        assert_eq!(envelope.sealed().len(), TAG_LENGTH);
        assert_eq!(decrypt(&envelope, &key).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_same_plaintext_gives_different_envelopes() {
        let key = key();
        let a = encrypt(b"same", &key).unwrap();
        let b = encrypt(b"same", &key).unwrap();
        assert_ne!(a.nonce(), b.nonce());
        assert_ne!(a.sealed(), b.sealed());
    }

    #[test]
    fn test_wrong_nonce_length_is_malformed() {
        let key = key();
        let good = encrypt(b"payload", &key).unwrap();
        let bad = Envelope::from_parts(vec![0u8; 8], good.sealed().to_vec());

        assert!(matches!(
            decrypt(&bad, &key),
            Err(CryptoError::EnvelopeMalformed(_))
        ));
    }

    #[test]
    fn test_empty_and_truncated_ciphertext_are_malformed() {
        let key = key();
        let empty = Envelope::from_parts(vec![0u8; NONCE_LENGTH], Vec::new());
        let truncated = Envelope::from_parts(vec![0u8; NONCE_LENGTH], vec![1u8; TAG_LENGTH - 1]);

        assert!(matches!(decrypt(&empty, &key), Err(CryptoError::EnvelopeMalformed(_))));
        assert!(matches!(decrypt(&truncated, &key), Err(CryptoError::EnvelopeMalformed(_))));
    }

    #[test]
    fn test_tampered_nonce_fails_authentication() {
        let key = key();
        let good = encrypt(b"payload", &key).unwrap();
        let mut nonce = good.nonce().to_vec();
        nonce[0] ^= 0x80;
        let bad = Envelope::from_parts(nonce, good.sealed().to_vec());

        assert_eq!(decrypt(&bad, &key), Err(CryptoError::AuthenticationFailure));
    }

    #[test]
    fn test_chacha_key_round_trip() {
        let key = SessionKey::generate(CipherSuite::ChaCha20Poly1305).unwrap();
        let envelope = encrypt(b"over chacha", &key).unwrap();
        assert_eq!(decrypt(&envelope, &key).unwrap(), b"over chacha");
    }
}
