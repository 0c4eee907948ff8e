//! Cryptographic module
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 MessagePipeline (api::messaging)            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │  gated on SessionState
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Session (state::session)                   │
//! │  - Unestablished → ClassicalSecure → PostQuantumSecure       │
//! │  - One session = one conversation, one epoch                │
//! └─────────────────────────────────────────────────────────────┘
//!                ┌─────────────┴─────────────┐
//!                ▼                           ▼
//! ┌───────────────────────────┐  ┌──────────────────────────┐
//! │   KeyManager (keys)       │  │  Envelope codec          │
//! │  - one live SessionKey    │  │  - fresh nonce per call  │
//! │  - zeroized on drop       │  │  - AEAD, empty AAD       │
//! └───────────────────────────┘  └──────────────────────────┘
//!                │                           │
//!                └─────────────┬─────────────┘
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              AeadProvider (crypto-agility)                  │
//! │  - AES-256-GCM (default)                                    │
//! │  - ChaCha20-Poly1305                                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

// ============================================================================
// Core Traits
// ============================================================================

/// AeadProvider trait for crypto-agility
pub mod provider;

// ============================================================================
// Implementations
// ============================================================================

/// Cipher suites (AES-256-GCM, ChaCha20-Poly1305)
pub mod suites;

// ============================================================================
// Keys & Envelopes
// ============================================================================

pub mod keys;

pub mod envelope;

// ============================================================================
// Re-exports
// ============================================================================

pub use envelope::{decrypt, encrypt, Envelope};
pub use keys::{KeyManager, SessionKey};
pub use provider::AeadProvider;
pub use suites::CipherSuite;

pub type SuiteID = u16;

/// Suite ID for AES-256-GCM
pub const AES_256_GCM_SUITE_ID: SuiteID = 1;
/// Suite ID for ChaCha20-Poly1305
pub const CHACHA20_POLY1305_SUITE_ID: SuiteID = 2;

/// Session key length in bytes (256 bit)
pub const KEY_LENGTH: usize = 32;
/// Nonce length in bytes (96 bit)
pub const NONCE_LENGTH: usize = 12;
/// Authentication tag length in bytes (128 bit)
pub const TAG_LENGTH: usize = 16;
