// Salsifie Core
// Encrypted session subsystem: session keys, envelope codec, trust-level
// state machine and the message pipeline built on them.

#![warn(clippy::all)]

// Модули
pub mod api;
pub mod config;
pub mod crypto;
pub mod error;
pub mod protocol;
pub mod state;
pub mod utils;

// Re-exports для удобства
pub use api::messaging::MessagePipeline;
pub use api::replies::{CannedReplies, ReplyGenerator};
pub use api::MessengerAPI;
pub use config::Config;
pub use crypto::{decrypt, encrypt, CipherSuite, Envelope, KeyManager, SessionKey};
pub use error::CryptoError;
pub use protocol::{Message, MessageContent, MessageKind, Payload, TransportFrame};
pub use state::{Session, SessionEpoch, SessionState};
pub use utils::error::{ChannelError, Result};
