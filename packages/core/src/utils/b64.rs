// Base64 utilities (printable form of envelopes and file previews)

use base64::{engine::general_purpose, Engine};

pub fn encode(data: &[u8]) -> String {
    general_purpose::STANDARD.encode(data)
}

pub fn decode(data: &str) -> Result<Vec<u8>, String> {
    general_purpose::STANDARD
        .decode(data)
        .map_err(|e| format!("Base64 decode failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rejects_invalid_input() {
        assert!(decode("not base64 !!").is_err());
        assert_eq!(decode(&encode(b"\x00\xffbin")).unwrap(), b"\x00\xffbin");
    }
}
