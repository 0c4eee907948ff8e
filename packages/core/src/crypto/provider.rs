//! Defines the AeadProvider trait for crypto-agility.

use crate::crypto::{SuiteID, KEY_LENGTH, NONCE_LENGTH};
use crate::error::CryptoError;

/// Trait that formalizes the AEAD operations of one cipher suite.
///
/// Every implementation must use a 256-bit key, a 96-bit nonce, a 128-bit
/// tag appended to the ciphertext, and empty associated data.
pub trait AeadProvider: Send + Sync + 'static {
    /// Wire-stable identifier of the suite.
    const SUITE_ID: SuiteID;

    /// Human-readable suite name, also accepted by `CipherSuite::from_str`.
    const NAME: &'static str;

    /// Encrypts `plaintext` and returns ciphertext with the tag appended.
    fn seal(
        key: &[u8; KEY_LENGTH],
        nonce: &[u8; NONCE_LENGTH],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;

    /// Verifies the tag and decrypts. Any mismatch is
    /// `CryptoError::AuthenticationFailure`; no plaintext is released.
    fn open(
        key: &[u8; KEY_LENGTH],
        nonce: &[u8; NONCE_LENGTH],
        sealed: &[u8],
    ) -> Result<Vec<u8>, CryptoError>;
}
