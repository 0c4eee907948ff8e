//! Property-based tests for the envelope codec.
//!
//! Round-trip over arbitrary payloads, and every single-bit change to the
//! ciphertext or tag must be rejected as an authentication failure.

use proptest::prelude::*;
use salsifie_core::crypto::{decrypt, encrypt, CipherSuite, Envelope, SessionKey, NONCE_LENGTH};
use salsifie_core::protocol::wire::{decode_envelope, encode_envelope};
use salsifie_core::CryptoError;
use std::collections::HashSet;
use std::sync::Arc;

fn suite_strategy() -> impl Strategy<Value = CipherSuite> {
    prop_oneof![Just(CipherSuite::Aes256Gcm), Just(CipherSuite::ChaCha20Poly1305)]
}

proptest! {
    /// decrypt(encrypt(P, K), K) == P for any payload, including empty.
    #[test]
    fn prop_round_trip(payload in prop::collection::vec(any::<u8>(), 0..4096), suite in suite_strategy()) {
        let key = SessionKey::generate(suite).unwrap();
        let envelope = encrypt(&payload, &key).unwrap();
        prop_assert_eq!(decrypt(&envelope, &key).unwrap(), payload);
    }

    /// Flipping any one bit of ciphertext or tag fails authentication.
    #[test]
    fn prop_single_bit_tamper_is_detected(
        payload in prop::collection::vec(any::<u8>(), 0..512),
        index in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let key = SessionKey::generate(CipherSuite::Aes256Gcm).unwrap();
        let envelope = encrypt(&payload, &key).unwrap();

        let mut sealed = envelope.sealed().to_vec();
        let position = index.index(sealed.len());
        sealed[position] ^= 1 << bit;
        let tampered = Envelope::from_parts(envelope.nonce().to_vec(), sealed);

        prop_assert_eq!(decrypt(&tampered, &key), Err(CryptoError::AuthenticationFailure));
    }

    /// The printable wire form decodes back to an envelope that opens.
    #[test]
    fn prop_wire_form_preserves_envelope(payload in prop::collection::vec(any::<u8>(), 0..256)) {
        let key = SessionKey::generate(CipherSuite::ChaCha20Poly1305).unwrap();
        let envelope = encrypt(&payload, &key).unwrap();

        let decoded = decode_envelope(&encode_envelope(&envelope)).unwrap();
        prop_assert_eq!(decrypt(&decoded, &key).unwrap(), payload);
    }
}

#[test]
fn test_nonces_unique_over_100k_encryptions() {
    let key = SessionKey::generate(CipherSuite::Aes256Gcm).unwrap();
    let mut seen = HashSet::with_capacity(100_000);

    for _ in 0..100_000 {
        let envelope = encrypt(b"n", &key).unwrap();
        let nonce: [u8; NONCE_LENGTH] = envelope.nonce().try_into().unwrap();
        assert!(seen.insert(nonce), "nonce reused");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_nonces_unique_under_concurrent_encryption() {
    let key = Arc::new(SessionKey::generate(CipherSuite::ChaCha20Poly1305).unwrap());

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let key = Arc::clone(&key);
            tokio::spawn(async move {
                (0..5_000)
                    .map(|_| {
                        let envelope = encrypt(b"shared key", &key).unwrap();
                        let nonce: [u8; NONCE_LENGTH] = envelope.nonce().try_into().unwrap();
                        nonce
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashSet::with_capacity(40_000);
    for task in tasks {
        for nonce in task.await.unwrap() {
            assert!(seen.insert(nonce), "nonce reused across tasks");
        }
    }
    assert_eq!(seen.len(), 40_000);
}

#[test]
fn test_wrong_key_is_authentication_failure() {
    let k1 = SessionKey::generate(CipherSuite::Aes256Gcm).unwrap();
    let k2 = SessionKey::generate(CipherSuite::Aes256Gcm).unwrap();

    let envelope = encrypt(b"secret", &k1).unwrap();
    assert_eq!(decrypt(&envelope, &k2), Err(CryptoError::AuthenticationFailure));
}
