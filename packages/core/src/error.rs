use thiserror::Error;

/// Errors raised by the key manager and the envelope codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The OS randomness source failed. Fatal: the session must not be
    /// established on weaker keys or nonces.
    #[error("Randomness source failed: {0}")]
    RandomnessFailure(String),

    /// Structural decode failure (wrong nonce length, empty ciphertext,
    /// truncated tag, undecodable wire form).
    #[error("Envelope malformed: {0}")]
    EnvelopeMalformed(String),

    /// Tag mismatch: tampered data, wrong key or rotated key.
    #[error("Envelope authentication failed")]
    AuthenticationFailure,

    #[error("AEAD encryption failed: {0}")]
    AeadEncryptionError(String),
}

impl CryptoError {
    /// Only a broken randomness source aborts the session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CryptoError::RandomnessFailure(_))
    }
}

impl From<rand::Error> for CryptoError {
    fn from(err: rand::Error) -> Self {
        CryptoError::RandomnessFailure(err.to_string())
    }
}
