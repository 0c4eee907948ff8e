// Conversation display list

use crate::api::replies::{HistoryEntry, Speaker};
use crate::protocol::messages::Message;

/// Messages of one conversation, in the order they completed.
///
/// Not sorted by timestamp: a send that finishes after a later-started
/// receive is shown after it.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub local_id: String,
    pub peer_id: String,
    messages: Vec<Message>,
    awaiting_reply: bool,
}

impl Conversation {
    pub fn new(local_id: impl Into<String>, peer_id: impl Into<String>) -> Self {
        Self {
            local_id: local_id.into(),
            peer_id: peer_id.into(),
            messages: Vec::new(),
            awaiting_reply: false,
        }
    }

    pub fn add_message(&mut self, msg: Message) {
        self.messages.push(msg);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Plaintext history for the reply collaborator.
    ///
    /// Undecryptable placeholders are left out; they are not conversation
    /// content.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.messages
            .iter()
            .filter(|m| !m.is_undecryptable())
            .map(|m| HistoryEntry {
                speaker: if m.sender_id == self.local_id {
                    Speaker::Local
                } else {
                    Speaker::Peer
                },
                text: m.display_text(),
            })
            .collect()
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn undecryptable_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_undecryptable()).count()
    }

    /// "Peer is typing" indicator.
    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    pub fn set_awaiting_reply(&mut self, awaiting: bool) {
        self.awaiting_reply = awaiting;
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.awaiting_reply = false;
    }
}
