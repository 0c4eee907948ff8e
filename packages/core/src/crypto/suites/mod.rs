//! Cipher suites
//!
//! Implementations of [`AeadProvider`] and the runtime selector
//! [`CipherSuite`] that a [`SessionKey`](crate::crypto::keys::SessionKey) is
//! bound to.
//!
//! ## Available suites
//!
//! ### AES-256-GCM (default)
//! - **Key**: 256 bit
//! - **Nonce**: 96 bit, random per message
//! - **Tag**: 128 bit
//! - **Suite ID**: 1
//!
//! ### ChaCha20-Poly1305
//! - Same sizes, constant-time in software
//! - **Suite ID**: 2
//!
//! ```rust
//! use salsifie_core::crypto::suites::CipherSuite;
//!
//! let suite: CipherSuite = "chacha20-poly1305".parse().unwrap();
//! assert_eq!(suite.id(), 2);
//! ```

pub mod aes_gcm;
pub mod chacha;

use crate::crypto::provider::AeadProvider;
use crate::crypto::{SuiteID, KEY_LENGTH, NONCE_LENGTH};
use crate::error::CryptoError;
use std::fmt;
use std::str::FromStr;

pub use self::aes_gcm::Aes256GcmProvider;
pub use self::chacha::ChaCha20Poly1305Provider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CipherSuite {
    #[default]
    Aes256Gcm,
    ChaCha20Poly1305,
}

impl CipherSuite {
    pub fn id(self) -> SuiteID {
        match self {
            CipherSuite::Aes256Gcm => Aes256GcmProvider::SUITE_ID,
            CipherSuite::ChaCha20Poly1305 => ChaCha20Poly1305Provider::SUITE_ID,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CipherSuite::Aes256Gcm => Aes256GcmProvider::NAME,
            CipherSuite::ChaCha20Poly1305 => ChaCha20Poly1305Provider::NAME,
        }
    }

    pub(crate) fn seal(
        self,
        key: &[u8; KEY_LENGTH],
        nonce: &[u8; NONCE_LENGTH],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        match self {
            CipherSuite::Aes256Gcm => Aes256GcmProvider::seal(key, nonce, plaintext),
            CipherSuite::ChaCha20Poly1305 => ChaCha20Poly1305Provider::seal(key, nonce, plaintext),
        }
    }

    pub(crate) fn open(
        self,
        key: &[u8; KEY_LENGTH],
        nonce: &[u8; NONCE_LENGTH],
        sealed: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        match self {
            CipherSuite::Aes256Gcm => Aes256GcmProvider::open(key, nonce, sealed),
            CipherSuite::ChaCha20Poly1305 => ChaCha20Poly1305Provider::open(key, nonce, sealed),
        }
    }
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CipherSuite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aes-256-gcm" | "aes256gcm" | "aes" => Ok(CipherSuite::Aes256Gcm),
            "chacha20-poly1305" | "chacha20poly1305" | "chacha" => {
                Ok(CipherSuite::ChaCha20Poly1305)
            }
            other => Err(format!("Unknown cipher suite: {}", other)),
        }
    }
}
