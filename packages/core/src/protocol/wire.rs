// Wire format
// Envelope as a printable blob, frames as MessagePack (transport) or JSON.

use crate::crypto::envelope::Envelope;
use crate::crypto::NONCE_LENGTH;
use crate::error::CryptoError;
use crate::protocol::messages::TransportFrame;
use crate::utils::error::{ChannelError, Result};
use rmp_serde::{Deserializer, Serializer};
use serde::{Deserialize, Serialize};

/// base64(nonce ‖ ciphertext ‖ tag)
pub fn encode_envelope(envelope: &Envelope) -> String {
    let mut blob = Vec::with_capacity(envelope.nonce().len() + envelope.sealed().len());
    blob.extend_from_slice(envelope.nonce());
    blob.extend_from_slice(envelope.sealed());
    crate::utils::b64::encode(&blob)
}

/// Exact inverse of [`encode_envelope`].
///
/// Only the split is checked here; tag length and authenticity are
/// checked by `decrypt`.
pub fn decode_envelope(encoded: &str) -> std::result::Result<Envelope, CryptoError> {
    let mut blob = crate::utils::b64::decode(encoded).map_err(CryptoError::EnvelopeMalformed)?;

    if blob.len() < NONCE_LENGTH {
        return Err(CryptoError::EnvelopeMalformed(format!(
            "envelope blob is {} bytes, shorter than the nonce",
            blob.len()
        )));
    }

    let sealed = blob.split_off(NONCE_LENGTH);
    Ok(Envelope::from_parts(blob, sealed))
}

/// Упаковать TransportFrame в MessagePack
pub fn pack_frame(frame: &TransportFrame) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    frame
        .serialize(&mut Serializer::new(&mut buffer))
        .map_err(|e| ChannelError::SerializationError(format!("MessagePack pack error: {}", e)))?;
    Ok(buffer)
}

/// Распаковать MessagePack в TransportFrame
pub fn unpack_frame(data: &[u8]) -> Result<TransportFrame> {
    let mut deserializer = Deserializer::new(data);
    TransportFrame::deserialize(&mut deserializer)
        .map_err(|e| ChannelError::SerializationError(format!("MessagePack unpack error: {}", e)))
}

pub fn frame_to_json(frame: &TransportFrame) -> Result<String> {
    serde_json::to_string(frame)
        .map_err(|e| ChannelError::SerializationError(format!("JSON encode error: {}", e)))
}

pub fn frame_from_json(json: &str) -> Result<TransportFrame> {
    serde_json::from_str(json)
        .map_err(|e| ChannelError::SerializationError(format!("JSON decode error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::envelope::encrypt;
    use crate::crypto::keys::SessionKey;
    use crate::crypto::suites::CipherSuite;
    use crate::protocol::messages::MessageKind;

    fn sample_frame() -> TransportFrame {
        let key = SessionKey::generate(CipherSuite::Aes256Gcm).unwrap();
        TransportFrame {
            message_id: crate::utils::uuid::generate_v4(),
            sender_id: "alice".to_string(),
            timestamp_millis: 1_700_000_000_000,
            kind: MessageKind::File {
                file_name: "notes.txt".to_string(),
                size_bytes: 4,
            },
            envelope: encrypt(b"data", &key).unwrap(),
        }
    }

    #[test]
    fn test_envelope_blob_layout() {
        let frame = sample_frame();
        let encoded = encode_envelope(&frame.envelope);
        let blob = crate::utils::b64::decode(&encoded).unwrap();

        assert_eq!(&blob[..NONCE_LENGTH], frame.envelope.nonce());
        assert_eq!(&blob[NONCE_LENGTH..], frame.envelope.sealed());
        assert_eq!(decode_envelope(&encoded).unwrap(), frame.envelope);
    }

    #[test]
    fn test_decode_rejects_short_or_invalid_blobs() {
        let short = crate::utils::b64::encode(&[0u8; NONCE_LENGTH - 1]);
        assert!(matches!(decode_envelope(&short), Err(CryptoError::EnvelopeMalformed(_))));
        assert!(matches!(decode_envelope("%%%"), Err(CryptoError::EnvelopeMalformed(_))));
    }

    #[test]
    fn test_frame_containers() {
        let frame = sample_frame();

        let packed = pack_frame(&frame).unwrap();
        assert_eq!(unpack_frame(&packed).unwrap(), frame);

        let json = frame_to_json(&frame).unwrap();
        assert!(json.contains("\"fileName\":\"notes.txt\""));
        assert!(!json.contains("data"));
        assert_eq!(frame_from_json(&json).unwrap(), frame);
    }

    #[test]
    fn test_unpack_garbage_is_serialization_error() {
        assert!(matches!(
            unpack_frame(&[0xc1, 0x00]),
            Err(ChannelError::SerializationError(_))
        ));
    }
}
