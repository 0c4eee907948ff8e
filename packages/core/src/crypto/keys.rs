// Session key management
// The KeyManager is the only holder of key material.

use crate::crypto::suites::CipherSuite;
use crate::crypto::KEY_LENGTH;
use crate::error::CryptoError;
use rand::rngs::OsRng;
use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Bytes of the SHA-256 digest shown in a key fingerprint.
const FINGERPRINT_BYTES: usize = 8;

/// 256-bit symmetric session key, bound to one cipher suite.
///
/// Never cloned, serialized or logged; wiped from memory on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SessionKey {
    bytes: [u8; KEY_LENGTH],
    #[zeroize(skip)]
    suite: CipherSuite,
}

impl SessionKey {
    /// Generate a key from the OS randomness source.
    ///
    /// # Errors
    ///
    /// `CryptoError::RandomnessFailure` if the OS source fails. The caller
    /// must abort session establishment, not retry with a weaker source.
    pub fn generate(suite: CipherSuite) -> Result<Self, CryptoError> {
        Self::generate_with(&mut OsRng, suite)
    }

    /// Generate a key from an explicit CSPRNG.
    pub fn generate_with<R: RngCore + CryptoRng>(
        rng: &mut R,
        suite: CipherSuite,
    ) -> Result<Self, CryptoError> {
        let mut key = Self {
            bytes: [0u8; KEY_LENGTH],
            suite,
        };
        rng.try_fill_bytes(&mut key.bytes)?;
        Ok(key)
    }

    pub fn suite(&self) -> CipherSuite {
        self.suite
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.bytes
    }

    /// Short hex fingerprint both parties can compare out of band.
    ///
    /// Derived through SHA-256, so it reveals nothing usable about the key.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(b"salsifie-session-key-fingerprint");
        hasher.update(self.bytes);
        let digest = hasher.finalize();

        hex::encode(&digest[..FINGERPRINT_BYTES])
            .as_bytes()
            .chunks(4)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKey")
            .field("suite", &self.suite)
            .field("bytes", &"<redacted>")
            .finish()
    }
}

/// Holder of the single live session key.
///
/// Keeps no history: a replaced key is either dropped (and zeroized) or
/// handed back to the caller by [`KeyManager::rotate`].
#[derive(Debug)]
pub struct KeyManager {
    suite: CipherSuite,
    current: Option<SessionKey>,
    generation: u32,
}

impl KeyManager {
    pub fn new(suite: CipherSuite) -> Self {
        Self {
            suite,
            current: None,
            generation: 0,
        }
    }

    /// Generate and install a fresh key, discarding the previous one.
    pub fn generate_key(&mut self) -> Result<&SessionKey, CryptoError> {
        let key = SessionKey::generate(self.suite)?;
        Ok(self.install(key))
    }

    /// Install a fresh key and return the one it replaces.
    ///
    /// Ciphertexts produced under the old key stay decryptable only while
    /// the caller keeps the returned value.
    pub fn rotate(&mut self) -> Result<Option<SessionKey>, CryptoError> {
        let key = SessionKey::generate(self.suite)?;
        let previous = self.current.take();
        self.install(key);
        Ok(previous)
    }

    fn install(&mut self, key: SessionKey) -> &SessionKey {
        self.generation += 1;
        tracing::debug!(
            target: "crypto::keys",
            generation = self.generation,
            suite = %self.suite,
            "Installed new session key"
        );
        &*self.current.insert(key)
    }

    pub fn current_key(&self) -> Option<&SessionKey> {
        self.current.as_ref()
    }

    pub fn has_key(&self) -> bool {
        self.current.is_some()
    }

    /// Drop (and zeroize) the live key.
    pub fn destroy(&mut self) {
        if self.current.take().is_some() {
            tracing::debug!(target: "crypto::keys", generation = self.generation, "Session key destroyed");
        }
    }

    /// Number of keys installed so far.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn suite(&self) -> CipherSuite {
        self.suite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU32;

    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand_core::Error> {
            Err(rand_core::Error::from(
                NonZeroU32::new(rand_core::Error::CUSTOM_START).unwrap(),
            ))
        }
    }

    impl CryptoRng for BrokenRng {}

    #[test]
    fn test_generated_keys_differ() {
        let a = SessionKey::generate(CipherSuite::Aes256Gcm).unwrap();
        let b = SessionKey::generate(CipherSuite::Aes256Gcm).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_broken_rng_is_randomness_failure() {
        let result = SessionKey::generate_with(&mut BrokenRng, CipherSuite::Aes256Gcm);
        assert!(matches!(result, Err(CryptoError::RandomnessFailure(_))));
    }

    #[test]
    fn test_debug_redacts_key_bytes() {
        let key = SessionKey::generate(CipherSuite::ChaCha20Poly1305).unwrap();
        let debug = format!("{:?}", key);
        assert!(debug.contains("redacted"));
        assert!(!debug.contains(&format!("{:?}", key.as_bytes())));
    }

    #[test]
    fn test_fingerprint_format() {
        let key = SessionKey::generate(CipherSuite::Aes256Gcm).unwrap();
        let fp = key.fingerprint();
        assert_eq!(fp.len(), 19); // 16 hex chars + 3 separators
        assert_eq!(fp, key.fingerprint());
    }

    #[test]
    fn test_key_manager_rotation_returns_previous() {
        let mut manager = KeyManager::new(CipherSuite::Aes256Gcm);
        assert!(!manager.has_key());
        assert_eq!(manager.rotate().unwrap().map(|k| k.fingerprint()), None);

        let first = manager.current_key().unwrap().fingerprint();
        let previous = manager.rotate().unwrap().unwrap();

        assert_eq!(previous.fingerprint(), first);
        assert_ne!(manager.current_key().unwrap().fingerprint(), first);
        assert_eq!(manager.generation(), 2);
    }

    #[test]
    fn test_key_manager_destroy() {
        let mut manager = KeyManager::new(CipherSuite::Aes256Gcm);
        manager.generate_key().unwrap();
        assert!(manager.has_key());

        manager.destroy();
        assert!(!manager.has_key());
        assert!(manager.current_key().is_none());
    }
}
