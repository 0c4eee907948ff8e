// Reply-generation collaborator
// Produces the peer's answer from plaintext history. Any failure is replaced
// by a fixed fallback; the user never sees a reply error.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    Local,
    Peer,
}

/// One plaintext line of conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub speaker: Speaker,
    pub text: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplyError {
    #[error("Reply generation timed out")]
    Timeout,

    #[error("Reply generation failed: {0}")]
    Failed(String),

    #[error("Reply generation returned nothing")]
    Empty,
}

#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn generate_reply(
        &self,
        history: &[HistoryEntry],
        last_message: &str,
    ) -> Result<String, ReplyError>;
}

const CANNED_RESPONSES: &[&str] = &[
    "Signal received loud and clear. Encryption holding.",
    "Data integrity verified at 100%.",
    "Interesting. Ghost protocol is active.",
    "Secure transmission. No anomaly detected.",
    "I'm keeping an eye on the network.",
    "Affirmative. Anonymity is total.",
    "Encryption keys have been renewed.",
    "Message intercepted and secured.",
    "Stable communication on the quantum channel.",
];

/// Local reply table with a simulated thinking delay.
#[derive(Debug, Clone)]
pub struct CannedReplies {
    think_time: Duration,
}

impl CannedReplies {
    pub fn new(think_time: Duration) -> Self {
        Self { think_time }
    }

    pub fn responses() -> &'static [&'static str] {
        CANNED_RESPONSES
    }
}

impl Default for CannedReplies {
    fn default() -> Self {
        Self::new(Duration::from_millis(
            crate::config::Config::global().reply_think_time_ms,
        ))
    }
}

#[async_trait]
impl ReplyGenerator for CannedReplies {
    async fn generate_reply(
        &self,
        _history: &[HistoryEntry],
        _last_message: &str,
    ) -> Result<String, ReplyError> {
        tokio::time::sleep(self.think_time).await;

        CANNED_RESPONSES
            .choose(&mut rand::thread_rng())
            .map(|reply| reply.to_string())
            .ok_or(ReplyError::Empty)
    }
}

/// Ask `generator` for a reply within `timeout`, or return `fallback`.
pub async fn reply_or_fallback<R: ReplyGenerator + ?Sized>(
    generator: &R,
    history: &[HistoryEntry],
    last_message: &str,
    timeout: Duration,
    fallback: &str,
) -> String {
    let outcome = match tokio::time::timeout(timeout, generator.generate_reply(history, last_message)).await {
        Ok(Ok(reply)) if reply.trim().is_empty() => Err(ReplyError::Empty),
        Ok(result) => result,
        Err(_) => Err(ReplyError::Timeout),
    };

    match outcome {
        Ok(reply) => reply,
        Err(err) => {
            tracing::warn!(target: "pipeline", error = %err, "Reply collaborator failed, using fallback");
            fallback.to_string()
        }
    }
}
