// Валидация исходящих и входящих данных

use crate::protocol::messages::{MessageKind, Payload, TransportFrame};
use crate::utils::error::{ChannelError, Result};

/// Outbound payload: non-blank and at most `max_bytes` long.
pub fn validate_payload(payload: &Payload, max_bytes: usize) -> Result<()> {
    if payload.is_blank() {
        return Err(ChannelError::ValidationError(
            "Message content cannot be empty".to_string(),
        ));
    }

    if payload.as_bytes().len() > max_bytes {
        return Err(ChannelError::ValidationError(format!(
            "Payload is {} bytes, limit is {}",
            payload.as_bytes().len(),
            max_bytes
        )));
    }

    if let Payload::File { file_name, .. } = payload {
        validate_file_name(file_name)?;
    }

    Ok(())
}

pub fn validate_file_name(file_name: &str) -> Result<()> {
    if file_name.trim().is_empty() {
        return Err(ChannelError::ValidationError(
            "File name cannot be empty".to_string(),
        ));
    }
    if file_name.contains(['/', '\\']) {
        return Err(ChannelError::ValidationError(
            "File name cannot contain path separators".to_string(),
        ));
    }
    Ok(())
}

/// Cleartext frame metadata. The envelope itself is judged by `decrypt`.
pub fn validate_frame(frame: &TransportFrame) -> Result<()> {
    if !crate::utils::uuid::is_valid(&frame.message_id) {
        return Err(ChannelError::ValidationError(format!(
            "Invalid message id: {}",
            frame.message_id
        )));
    }

    if frame.sender_id.is_empty() {
        return Err(ChannelError::ValidationError(
            "Sender id cannot be empty".to_string(),
        ));
    }

    if let MessageKind::File { file_name, .. } = &frame.kind {
        validate_file_name(file_name)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_payloads_rejected() {
        assert!(validate_payload(&Payload::text("  \n"), 64).is_err());
        assert!(validate_payload(&Payload::file("a.bin", vec![]), 64).is_err());
        assert!(validate_payload(&Payload::text("hi"), 64).is_ok());
    }

    #[test]
    fn test_file_name_rules() {
        assert!(validate_file_name("report.pdf").is_ok());
        assert!(validate_file_name("").is_err());
        assert!(validate_file_name("../etc/passwd").is_err());
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let payload = Payload::file("small.bin", vec![0u8; 8]);
        assert!(validate_payload(&payload, 8).is_ok());
        assert!(matches!(
            validate_payload(&payload, 7),
            Err(ChannelError::ValidationError(_))
        ));
    }
}
