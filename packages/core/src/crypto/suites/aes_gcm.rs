use crate::crypto::provider::AeadProvider;
use crate::crypto::{SuiteID, KEY_LENGTH, NONCE_LENGTH};
use crate::error::CryptoError;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};

/// AES-256-GCM, the default suite.
pub struct Aes256GcmProvider;

impl AeadProvider for Aes256GcmProvider {
    const SUITE_ID: SuiteID = crate::crypto::AES_256_GCM_SUITE_ID;
    const NAME: &'static str = "aes-256-gcm";

    fn seal(
        key: &[u8; KEY_LENGTH],
        nonce: &[u8; NONCE_LENGTH],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
        cipher
            .encrypt(Nonce::from_slice(nonce), plaintext)
            .map_err(|e| CryptoError::AeadEncryptionError(e.to_string()))
    }

    fn open(
        key: &[u8; KEY_LENGTH],
        nonce: &[u8; NONCE_LENGTH],
        sealed: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
        cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| CryptoError::AuthenticationFailure)
    }
}
