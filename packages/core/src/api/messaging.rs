//! Message pipeline
//!
//! Orchestrates sending and receiving for one conversation over one session.
//!
//! ```text
//!   send:    Payload ─► gate ─► encrypt ─► Transport::deliver ─► display (local plaintext)
//!   receive: Frame   ─► gate ─► decrypt ─► display (plaintext | placeholder)
//!   reply:   history ─► ReplyGenerator (timeout, fallback) ─► encrypt ─► receive path
//! ```
//!
//! ## Concurrency
//!
//! The session sits behind an `RwLock`, the conversation behind a `Mutex`.
//! Locks are always taken session first, then conversation, and neither is
//! held across a transport or reply await. Every operation that suspends
//! records the session epoch first and drops its result if the session was
//! torn down meanwhile.

use crate::api::replies::{reply_or_fallback, ReplyGenerator};
use crate::config::Config;
use crate::protocol::messages::{
    DecryptFailure, Message, MessageContent, MessageKind, Payload, TransportFrame,
};
use crate::protocol::transport::Transport;
use crate::protocol::validation::{validate_frame, validate_payload};
use crate::state::conversations::Conversation;
use crate::state::session::{Session, SessionEpoch, SessionState};
use crate::utils::error::{ChannelError, Result};
use crate::utils::time::current_timestamp_millis;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

pub struct MessagePipeline<T: Transport, R: ReplyGenerator> {
    local_id: String,
    peer_id: String,
    session: RwLock<Session>,
    conversation: Mutex<Conversation>,
    transport: T,
    replies: R,
    config: Config,
}

impl<T: Transport, R: ReplyGenerator> MessagePipeline<T, R> {
    /// Pipeline using the global configuration.
    pub fn new(local_id: &str, peer_id: &str, transport: T, replies: R) -> Self {
        Self::with_config(local_id, peer_id, transport, replies, Config::global().clone())
    }

    pub fn with_config(
        local_id: &str,
        peer_id: &str,
        transport: T,
        replies: R,
        config: Config,
    ) -> Self {
        Self {
            local_id: local_id.to_string(),
            peer_id: peer_id.to_string(),
            session: RwLock::new(Session::new(config.cipher_suite)),
            conversation: Mutex::new(Conversation::new(local_id, peer_id)),
            transport,
            replies,
            config,
        }
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    /// Handshake milestone: generates the session key.
    pub async fn begin_handshake(&self) -> Result<()> {
        self.session.write().await.handshake_started()?;
        Ok(())
    }

    /// Key exchange milestone: opens the gate.
    pub async fn complete_key_exchange(&self) {
        self.session.write().await.key_exchange_completed();
    }

    /// Both milestones in order.
    pub async fn establish(&self) -> Result<()> {
        let mut session = self.session.write().await;
        session.handshake_started()?;
        session.key_exchange_completed();
        Ok(())
    }

    /// Replace the session with a fresh Unestablished one.
    ///
    /// Displayed messages stay; anything still in flight under the old
    /// epoch is dropped when it completes.
    pub async fn teardown(&self) -> SessionEpoch {
        let mut session = self.session.write().await;
        let epoch = session.teardown();
        self.conversation.lock().await.set_awaiting_reply(false);
        epoch
    }

    // ========================================================================
    // Send
    // ========================================================================

    /// Encrypt and deliver one payload, then show the local plaintext copy.
    pub async fn send(&self, payload: Payload) -> Result<Message> {
        validate_payload(&payload, self.config.max_payload_bytes)?;

        let (epoch, envelope) = {
            let session = self.session.read().await;
            let envelope = session.encrypt(payload.as_bytes()).map_err(|err| {
                tracing::warn!(target: "pipeline", state = %session.state(), error = %err, "Send rejected");
                err
            })?;
            (session.epoch(), envelope)
        };

        let frame = TransportFrame {
            message_id: crate::utils::uuid::generate_v4(),
            sender_id: self.local_id.clone(),
            timestamp_millis: current_timestamp_millis(),
            kind: payload.kind(),
            envelope,
        };
        let message_id = frame.message_id.clone();
        let timestamp_millis = frame.timestamp_millis;
        let envelope = frame.envelope.clone();

        self.transport.deliver(frame).await?;

        let session = self.session.read().await;
        if session.epoch() != epoch {
            tracing::debug!(target: "pipeline", epoch = %epoch, "Dropping send result from torn-down session");
            return Err(ChannelError::StaleSession(epoch));
        }

        let message = Message::outbound(
            message_id,
            self.local_id.clone(),
            timestamp_millis,
            payload,
            envelope,
        );
        self.conversation.lock().await.add_message(message.clone());

        let kind = if message.kind.is_file() { "file" } else { "text" };
        tracing::info!(target: "pipeline", message_id = %message.id, kind, "Message sent");
        Ok(message)
    }

    /// Send, then ask the reply collaborator for the peer's answer.
    pub async fn send_and_reply(&self, payload: Payload) -> Result<(Message, Option<Message>)> {
        let sent = self.send(payload).await?;
        let reply = self.request_reply(&sent).await?;
        Ok((sent, reply))
    }

    // ========================================================================
    // Reply
    // ========================================================================

    /// Generate the peer's reply to `last` and show it through the
    /// encrypted inbound path.
    ///
    /// Returns `Ok(None)` if the session was torn down while waiting.
    pub async fn request_reply(&self, last: &Message) -> Result<Option<Message>> {
        let epoch = {
            let session = self.session.read().await;
            if !session.state().is_ready() {
                return Err(ChannelError::ChannelNotReady(session.state()));
            }
            session.epoch()
        };

        let history = {
            let mut conversation = self.conversation.lock().await;
            conversation.set_awaiting_reply(true);
            conversation.history()
        };

        let reply_text = reply_or_fallback(
            &self.replies,
            &history,
            &last.display_text(),
            Duration::from_millis(self.config.reply_timeout_ms),
            &self.config.reply_fallback_text,
        )
        .await;

        self.inject_from_peer(&reply_text, epoch).await
    }

    /// Show the configured greeting as a peer message. No-op without one.
    pub async fn inject_greeting(&self) -> Result<Option<Message>> {
        let Some(greeting) = self.config.greeting_text.clone() else {
            return Ok(None);
        };
        let epoch = self.session.read().await.epoch();
        self.inject_from_peer(&greeting, epoch).await
    }

    /// Seal `text` as the peer and open it again through [`Self::receive`]'s
    /// path, so peer messages are only ever shown after verification.
    async fn inject_from_peer(&self, text: &str, epoch: SessionEpoch) -> Result<Option<Message>> {
        let session = self.session.read().await;
        if session.epoch() != epoch {
            tracing::debug!(target: "pipeline", epoch = %epoch, "Dropping reply from torn-down session");
            return Ok(None);
        }

        let sealed = session.encrypt(text.as_bytes()).map(|envelope| TransportFrame {
            message_id: crate::utils::uuid::generate_v4(),
            sender_id: self.peer_id.clone(),
            timestamp_millis: current_timestamp_millis(),
            kind: MessageKind::Text,
            envelope,
        });

        let mut conversation = self.conversation.lock().await;
        conversation.set_awaiting_reply(false);

        let message = open_frame(&session, sealed?)?;
        conversation.add_message(message.clone());
        Ok(Some(message))
    }

    // ========================================================================
    // Receive
    // ========================================================================

    /// Verify and display an inbound frame.
    ///
    /// Decryption failures do not end the conversation: they are shown as a
    /// placeholder and reported as `Ok`.
    pub async fn receive(&self, frame: TransportFrame) -> Result<Message> {
        validate_frame(&frame)?;

        let session = self.session.read().await;
        let message = open_frame(&session, frame)?;
        self.conversation.lock().await.add_message(message.clone());
        Ok(message)
    }

    // ========================================================================
    // Presentation accessors
    // ========================================================================

    pub async fn state(&self) -> SessionState {
        self.session.read().await.state()
    }

    pub async fn epoch(&self) -> SessionEpoch {
        self.session.read().await.epoch()
    }

    pub async fn key_fingerprint(&self) -> Option<String> {
        self.session.read().await.key_fingerprint()
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.conversation.lock().await.messages().to_vec()
    }

    pub async fn is_awaiting_reply(&self) -> bool {
        self.conversation.lock().await.is_awaiting_reply()
    }

    pub async fn last_message(&self) -> Option<Message> {
        self.conversation.lock().await.last_message().cloned()
    }

    /// Placeholders shown so far, for a "messages could not be read" badge.
    pub async fn undecryptable_count(&self) -> usize {
        self.conversation.lock().await.undecryptable_count()
    }

    /// Empty the displayed list. The session is untouched.
    pub async fn clear_conversation(&self) {
        self.conversation.lock().await.clear();
        tracing::debug!(target: "pipeline", peer = %self.peer_id, "Conversation cleared");
    }

    pub fn local_id(&self) -> &str {
        &self.local_id
    }

    pub fn peer_id(&self) -> &str {
        &self.peer_id
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Gate, decrypt and build the display message for one frame.
fn open_frame(session: &Session, frame: TransportFrame) -> Result<Message> {
    let content = match session.decrypt(&frame.envelope) {
        Ok(plaintext) => match &frame.kind {
            MessageKind::Text => match String::from_utf8(plaintext) {
                Ok(text) => MessageContent::Text(text),
                Err(_) => {
                    tracing::warn!(target: "pipeline", message_id = %frame.message_id, "Authentic payload is not UTF-8 text");
                    MessageContent::Undecryptable(DecryptFailure::Corrupted)
                }
            },
            MessageKind::File { size_bytes, .. } if *size_bytes == plaintext.len() as u64 => {
                MessageContent::File { data: plaintext }
            }
            MessageKind::File { size_bytes, .. } => {
                tracing::warn!(
                    target: "pipeline",
                    message_id = %frame.message_id,
                    claimed = size_bytes,
                    actual = plaintext.len(),
                    "File size in frame does not match decrypted content"
                );
                MessageContent::Undecryptable(DecryptFailure::Corrupted)
            }
        },
        Err(ChannelError::Crypto(err)) => {
            tracing::warn!(
                target: "pipeline",
                message_id = %frame.message_id,
                epoch = %session.epoch(),
                error = %err,
                "Inbound envelope could not be decrypted"
            );
            MessageContent::Undecryptable(DecryptFailure::from(&err))
        }
        Err(err) => {
            tracing::warn!(target: "pipeline", message_id = %frame.message_id, error = %err, "Receive rejected");
            return Err(err);
        }
    };

    let quantum_verified =
        session.state() == SessionState::PostQuantumSecure && !matches!(content, MessageContent::Undecryptable(_));

    Ok(Message {
        id: frame.message_id,
        sender_id: frame.sender_id,
        timestamp_millis: frame.timestamp_millis,
        kind: frame.kind,
        content,
        envelope: Some(frame.envelope),
        quantum_verified,
    })
}
