// Message types shared by the pipeline, the transport and the presentation layer

use crate::crypto::envelope::Envelope;
use crate::error::CryptoError;
use serde::{Deserialize, Serialize};

/// Outbound content handed to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    File { file_name: String, bytes: Vec<u8> },
}

impl Payload {
    pub fn text(text: impl Into<String>) -> Self {
        Payload::Text(text.into())
    }

    pub fn file(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Payload::File {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Payload::Text(_) => MessageKind::Text,
            Payload::File { file_name, bytes } => MessageKind::File {
                file_name: file_name.clone(),
                size_bytes: bytes.len() as u64,
            },
        }
    }

    /// The bytes that go through the envelope codec.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Text(text) => text.as_bytes(),
            Payload::File { bytes, .. } => bytes,
        }
    }

    /// Blank text or an empty file carries nothing worth sending.
    pub fn is_blank(&self) -> bool {
        match self {
            Payload::Text(text) => text.trim().is_empty(),
            Payload::File { bytes, .. } => bytes.is_empty(),
        }
    }

    fn into_content(self) -> MessageContent {
        match self {
            Payload::Text(text) => MessageContent::Text(text),
            Payload::File { bytes, .. } => MessageContent::File { data: bytes },
        }
    }
}

/// Message kind. Travels next to the envelope; the codec never looks at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MessageKind {
    Text,
    #[serde(rename_all = "camelCase")]
    File { file_name: String, size_bytes: u64 },
}

impl MessageKind {
    pub fn is_file(&self) -> bool {
        matches!(self, MessageKind::File { .. })
    }
}

/// Why an inbound envelope could not be turned into content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecryptFailure {
    /// Structurally broken envelope or undecodable payload.
    Corrupted,
    /// Tag mismatch: tampering or keys out of sync.
    Desynchronized,
}

impl DecryptFailure {
    pub fn placeholder(self) -> &'static str {
        match self {
            DecryptFailure::Corrupted => "[Message corrupted or tampered]",
            DecryptFailure::Desynchronized => "[Channel desynchronized: message could not be decrypted]",
        }
    }
}

impl From<&CryptoError> for DecryptFailure {
    fn from(err: &CryptoError) -> Self {
        match err {
            CryptoError::AuthenticationFailure => DecryptFailure::Desynchronized,
            _ => DecryptFailure::Corrupted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageContent {
    Text(String),
    File {
        #[serde(with = "serde_bytes")]
        data: Vec<u8>,
    },
    Undecryptable(DecryptFailure),
}

/// A message as shown in the conversation.
///
/// Outbound messages keep the sender's own plaintext; inbound messages hold
/// what decryption produced, or an explicit placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub timestamp_millis: i64,
    pub kind: MessageKind,
    pub content: MessageContent,
    pub envelope: Option<Envelope>,
    /// Produced or verified under a PostQuantumSecure session.
    pub quantum_verified: bool,
}

impl Message {
    pub(crate) fn outbound(
        id: String,
        sender_id: String,
        timestamp_millis: i64,
        payload: Payload,
        envelope: Envelope,
    ) -> Self {
        Self {
            id,
            sender_id,
            timestamp_millis,
            kind: payload.kind(),
            content: payload.into_content(),
            envelope: Some(envelope),
            quantum_verified: true,
        }
    }

    pub fn is_undecryptable(&self) -> bool {
        matches!(self.content, MessageContent::Undecryptable(_))
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Line shown in the message list (and in the reply history).
    pub fn display_text(&self) -> String {
        match (&self.content, &self.kind) {
            (MessageContent::Text(text), _) => text.clone(),
            (MessageContent::File { .. }, MessageKind::File { file_name, size_bytes }) => {
                format!("File sent: {} ({})", file_name, format_file_size(*size_bytes))
            }
            (MessageContent::File { data }, MessageKind::Text) => {
                format!("File sent ({})", format_file_size(data.len() as u64))
            }
            (MessageContent::Undecryptable(failure), _) => failure.placeholder().to_string(),
        }
    }

    /// File bytes in printable form for previews.
    pub fn file_data_base64(&self) -> Option<String> {
        match &self.content {
            MessageContent::File { data } => Some(crate::utils::b64::encode(data)),
            _ => None,
        }
    }
}

/// What crosses the transport boundary. Content exists only inside the
/// envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportFrame {
    pub message_id: String,
    pub sender_id: String,
    pub timestamp_millis: i64,
    pub kind: MessageKind,
    pub envelope: Envelope,
}

/// "12.3 KB", one decimal place.
pub fn format_file_size(size_bytes: u64) -> String {
    format!("{:.1} KB", size_bytes as f64 / 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_size_label() {
        assert_eq!(format_file_size(0), "0.0 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(12_595), "12.3 KB");
    }

    #[test]
    fn test_payload_kind_and_blankness() {
        assert_eq!(Payload::text("hi").kind(), MessageKind::Text);
        assert!(Payload::text("   ").is_blank());
        assert!(Payload::file("a.bin", Vec::new()).is_blank());

        let file = Payload::file("photo.png", vec![1, 2, 3]);
        assert_eq!(
            file.kind(),
            MessageKind::File {
                file_name: "photo.png".to_string(),
                size_bytes: 3
            }
        );
        assert_eq!(file.as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_failure_mapping_is_distinct() {
        let corrupted = DecryptFailure::from(&CryptoError::EnvelopeMalformed("nonce".into()));
        let desync = DecryptFailure::from(&CryptoError::AuthenticationFailure);

        assert_eq!(corrupted, DecryptFailure::Corrupted);
        assert_eq!(desync, DecryptFailure::Desynchronized);
        assert_ne!(corrupted.placeholder(), desync.placeholder());
    }

    #[test]
    fn test_file_message_preview() {
        let message = Message {
            id: "m1".to_string(),
            sender_id: "me".to_string(),
            timestamp_millis: 0,
            kind: Payload::file("a.bin", vec![0xde, 0xad]).kind(),
            content: MessageContent::File { data: vec![0xde, 0xad] },
            envelope: None,
            quantum_verified: true,
        };

        assert_eq!(message.file_data_base64().as_deref(), Some("3q0="));
        assert_eq!(message.display_text(), "File sent: a.bin (0.0 KB)");
        assert!(message.text().is_none());
    }
}
