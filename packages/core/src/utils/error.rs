// Channel-level error types

use crate::error::CryptoError;
use crate::state::session::{SessionEpoch, SessionState};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChannelError {
    /// Send/receive attempted before the session reached PostQuantumSecure.
    #[error("Channel not ready: session is {0}")]
    ChannelNotReady(SessionState),

    #[error("Cryptography error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Result of an operation started under a session that has since been
    /// torn down.
    #[error("Stale result from torn-down session {0}")]
    StaleSession(SessionEpoch),

    #[error("Story not found: {0}")]
    StoryNotFound(String),

    #[error("Story expired: {0}")]
    StoryExpired(String),
}

impl ChannelError {
    /// Text the presentation layer shows for this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            ChannelError::Crypto(CryptoError::RandomnessFailure(_)) => {
                "Secure channel could not be established."
            }
            ChannelError::Crypto(CryptoError::EnvelopeMalformed(_)) => {
                "Message corrupted or tampered."
            }
            ChannelError::Crypto(CryptoError::AuthenticationFailure) => {
                "Channel desynchronized: message could not be decrypted."
            }
            ChannelError::Crypto(CryptoError::AeadEncryptionError(_)) => {
                "Message could not be encrypted."
            }
            ChannelError::ChannelNotReady(_) => "Secure channel is still negotiating.",
            ChannelError::TransportError(_) => "Message could not be delivered.",
            ChannelError::SerializationError(_) => "Message could not be encoded.",
            ChannelError::ValidationError(_) => "Message rejected.",
            ChannelError::StaleSession(_) => "Session was reset.",
            ChannelError::StoryNotFound(_) => "Story not found.",
            ChannelError::StoryExpired(_) => "Story has expired.",
        }
    }

    /// Whether the whole session must be abandoned.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ChannelError::Crypto(err) if err.is_fatal())
    }
}

pub type Result<T> = std::result::Result<T, ChannelError>;
