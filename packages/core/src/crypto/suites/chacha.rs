use crate::crypto::provider::AeadProvider;
use crate::crypto::{SuiteID, KEY_LENGTH, NONCE_LENGTH};
use crate::error::CryptoError;
use chacha20poly1305::{
    aead::{Aead, Payload},
    ChaCha20Poly1305, Key as AeadKeyChacha, KeyInit, Nonce,
};

/// ChaCha20-Poly1305, for platforms without AES hardware.
pub struct ChaCha20Poly1305Provider;

impl AeadProvider for ChaCha20Poly1305Provider {
    const SUITE_ID: SuiteID = crate::crypto::CHACHA20_POLY1305_SUITE_ID;
    const NAME: &'static str = "chacha20-poly1305";

    fn seal(
        key: &[u8; KEY_LENGTH],
        nonce: &[u8; NONCE_LENGTH],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let cipher = ChaCha20Poly1305::new(AeadKeyChacha::from_slice(key));
        let payload = Payload {
            msg: plaintext,
            aad: b"",
        };

        cipher
            .encrypt(Nonce::from_slice(nonce), payload)
            .map_err(|e| CryptoError::AeadEncryptionError(e.to_string()))
    }

    fn open(
        key: &[u8; KEY_LENGTH],
        nonce: &[u8; NONCE_LENGTH],
        sealed: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let cipher = ChaCha20Poly1305::new(AeadKeyChacha::from_slice(key));
        let payload = Payload {
            msg: sealed,
            aad: b"",
        };

        cipher
            .decrypt(Nonce::from_slice(nonce), payload)
            .map_err(|_| CryptoError::AuthenticationFailure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_appends_tag() {
        let key = [3u8; KEY_LENGTH];
        let nonce = [9u8; NONCE_LENGTH];
        let plaintext = b"Secret message";

        let sealed = ChaCha20Poly1305Provider::seal(&key, &nonce, plaintext).unwrap();
        assert_eq!(sealed.len(), plaintext.len() + crate::crypto::TAG_LENGTH);

        let opened = ChaCha20Poly1305Provider::open(&key, &nonce, &sealed).unwrap();
        assert_eq!(opened, plaintext);
    }

    #[test]
    fn test_open_fails_with_wrong_nonce() {
        let key = [3u8; KEY_LENGTH];
        let sealed = ChaCha20Poly1305Provider::seal(&key, &[1u8; NONCE_LENGTH], b"x").unwrap();
        assert_eq!(
            ChaCha20Poly1305Provider::open(&key, &[2u8; NONCE_LENGTH], &sealed),
            Err(CryptoError::AuthenticationFailure)
        );
    }
}
