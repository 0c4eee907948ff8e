//! Session - trust level and key of one conversation
//!
//! ## State machine
//!
//! ```text
//!  Unestablished ──handshake_started──► ClassicalSecure ──key_exchange_completed──► PostQuantumSecure
//!        ▲                                                                                │
//!        └──────────────────────────────── teardown (new session) ◄───────────────────────┘
//! ```
//!
//! A key exists exactly when the state is not `Unestablished`. The envelope
//! codec is reachable through a session only in `PostQuantumSecure`.
//!
//! ## Responsibilities
//!
//! - Owning the KeyManager for the conversation
//! - Enforcing transition order
//! - Gating encrypt/decrypt
//!
//! ## Not responsible for
//!
//! - Message metadata and display (that is the pipeline)
//! - Delivery (that is the transport)

use crate::crypto::envelope::{self, Envelope};
use crate::crypto::keys::{KeyManager, SessionKey};
use crate::crypto::suites::CipherSuite;
use crate::error::CryptoError;
use crate::utils::error::{ChannelError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_EPOCH: AtomicU64 = AtomicU64::new(1);

/// Trust level of the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SessionState {
    Unestablished,
    ClassicalSecure,
    PostQuantumSecure,
}

impl SessionState {
    /// Graduated feedback for the presentation layer.
    pub fn label(self) -> &'static str {
        match self {
            SessionState::Unestablished => "negotiating",
            SessionState::ClassicalSecure => "basic encryption",
            SessionState::PostQuantumSecure => "fully hardened",
        }
    }

    /// The single gate condition for sending and receiving.
    pub fn is_ready(self) -> bool {
        self == SessionState::PostQuantumSecure
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Unestablished => "Unestablished",
            SessionState::ClassicalSecure => "ClassicalSecure",
            SessionState::PostQuantumSecure => "PostQuantumSecure",
        };
        f.write_str(name)
    }
}

/// Process-unique tag of one session instance.
///
/// Results of operations started under an older epoch are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionEpoch(u64);

impl SessionEpoch {
    fn next() -> Self {
        SessionEpoch(NEXT_EPOCH.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One conversation's key and trust level.
#[derive(Debug)]
pub struct Session {
    id: String,
    epoch: SessionEpoch,
    state: SessionState,
    keys: KeyManager,
    created_at: i64,
}

impl Session {
    pub fn new(suite: CipherSuite) -> Self {
        let session = Self {
            id: crate::utils::uuid::generate_v4(),
            epoch: SessionEpoch::next(),
            state: SessionState::Unestablished,
            keys: KeyManager::new(suite),
            created_at: crate::utils::time::current_timestamp_millis(),
        };

        tracing::info!(
            target: "crypto::session",
            session_id = %session.id,
            epoch = %session.epoch,
            suite = %suite,
            "Session created"
        );

        session
    }

    /// Unestablished → ClassicalSecure. Generates the session key.
    ///
    /// # Errors
    ///
    /// `RandomnessFailure` leaves the session Unestablished; establishment
    /// must be abandoned.
    ///
    /// # Panics
    ///
    /// If the session is not Unestablished (broken orchestration).
    pub fn handshake_started(&mut self) -> std::result::Result<(), CryptoError> {
        assert_eq!(
            self.state,
            SessionState::Unestablished,
            "handshake_started called in state {}",
            self.state
        );

        if let Err(err) = self.keys.generate_key() {
            tracing::error!(
                target: "crypto::session",
                epoch = %self.epoch,
                error = %err,
                "Secure channel could not be established"
            );
            return Err(err);
        }

        self.state = SessionState::ClassicalSecure;
        tracing::info!(
            target: "crypto::session",
            epoch = %self.epoch,
            state = %self.state,
            "Handshake started"
        );
        Ok(())
    }

    /// ClassicalSecure → PostQuantumSecure.
    ///
    /// # Panics
    ///
    /// If the session is not ClassicalSecure (broken orchestration).
    pub fn key_exchange_completed(&mut self) {
        assert_eq!(
            self.state,
            SessionState::ClassicalSecure,
            "key_exchange_completed called in state {}",
            self.state
        );
        assert!(self.keys.has_key(), "ClassicalSecure session without a key");

        self.state = SessionState::PostQuantumSecure;
        tracing::info!(
            target: "crypto::session",
            epoch = %self.epoch,
            state = %self.state,
            "Key exchange completed"
        );
    }

    /// Replace this session with a fresh Unestablished one.
    ///
    /// The old key is zeroized; the new session has a new epoch.
    pub fn teardown(&mut self) -> SessionEpoch {
        let old_epoch = self.epoch;
        let suite = self.keys.suite();
        self.keys.destroy();
        *self = Session::new(suite);

        tracing::info!(
            target: "crypto::session",
            old_epoch = %old_epoch,
            new_epoch = %self.epoch,
            "Session torn down"
        );
        self.epoch
    }

    /// Key for the codec, only when messaging is permitted.
    fn ready_key(&self) -> Result<&SessionKey> {
        match self.keys.current_key() {
            Some(key) if self.state.is_ready() => Ok(key),
            _ => Err(ChannelError::ChannelNotReady(self.state)),
        }
    }

    /// Gated encryption.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Envelope> {
        let key = self.ready_key()?;
        Ok(envelope::encrypt(plaintext, key)?)
    }

    /// Gated decryption.
    pub fn decrypt(&self, envelope: &Envelope) -> Result<Vec<u8>> {
        let key = self.ready_key()?;
        Ok(envelope::decrypt(envelope, key)?)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn epoch(&self) -> SessionEpoch {
        self.epoch
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn suite(&self) -> CipherSuite {
        self.keys.suite()
    }

    pub fn has_key(&self) -> bool {
        self.keys.has_key()
    }

    pub fn key_fingerprint(&self) -> Option<String> {
        self.keys.current_key().map(SessionKey::fingerprint)
    }
}
