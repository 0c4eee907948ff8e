//! Centralised configuration for the Salsifie core
//!
//! Every tunable lives here so the rest of the crate never hardcodes them.
//! AEAD sizes are not tunable; they are compile-time constants in
//! [`crate::crypto`].

use crate::crypto::suites::CipherSuite;
use std::sync::OnceLock;

/// Process-wide configuration (singleton)
static GLOBAL_CONFIG: OnceLock<Config> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Config {
    // ============================================
    // CRYPTOGRAPHY
    // ============================================

    /// AEAD suite used for new session keys
    pub cipher_suite: CipherSuite,

    /// Largest payload (text or file bytes) accepted by the pipeline
    pub max_payload_bytes: usize,

    // ============================================
    // REPLY COLLABORATOR
    // ============================================

    /// Upper bound for one reply-generation round trip (milliseconds)
    pub reply_timeout_ms: u64,

    /// Simulated "thinking" delay of the canned reply table (milliseconds)
    pub reply_think_time_ms: u64,

    /// Substituted when the reply collaborator fails or times out
    pub reply_fallback_text: String,

    // ============================================
    // EPHEMERAL MEDIA
    // ============================================

    /// Lifetime of a published story (seconds)
    /// Default: 24 hours
    pub story_ttl_secs: i64,

    // ============================================
    // PRESENTATION
    // ============================================

    /// Peer greeting injected through the encrypted inbound path once the
    /// channel is fully hardened. `None` disables it.
    pub greeting_text: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cipher_suite: CipherSuite::Aes256Gcm,
            max_payload_bytes: 25 * 1024 * 1024,

            reply_timeout_ms: 5_000,
            reply_think_time_ms: 800,
            reply_fallback_text: "Signal received. Secure channel holding.".to_string(),

            story_ttl_secs: 24 * 60 * 60, // 24 hours

            greeting_text: Some("Secure connection established. Salsifie channel active.".to_string()),
        }
    }
}

impl Config {
    /// Build a configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("CIPHER_SUITE") {
            match val.parse() {
                Ok(suite) => config.cipher_suite = suite,
                Err(e) => tracing::warn!(target: "config", error = %e, "Ignoring CIPHER_SUITE"),
            }
        }

        if let Ok(val) = std::env::var("MAX_PAYLOAD_BYTES") {
            if let Ok(parsed) = val.parse() {
                config.max_payload_bytes = parsed;
            }
        }

        if let Ok(val) = std::env::var("REPLY_TIMEOUT_MS") {
            if let Ok(parsed) = val.parse() {
                config.reply_timeout_ms = parsed;
            }
        }

        if let Ok(val) = std::env::var("STORY_TTL_SECS") {
            if let Ok(parsed) = val.parse() {
                config.story_ttl_secs = parsed;
            }
        }

        config
    }

    /// Get the global configuration
    ///
    /// Initialises it with defaults on first use.
    pub fn global() -> &'static Config {
        GLOBAL_CONFIG.get_or_init(Config::default)
    }

    /// Initialise the global configuration with defaults
    ///
    /// # Errors
    ///
    /// Fails if the configuration was already initialised
    pub fn init() -> Result<(), &'static str> {
        GLOBAL_CONFIG
            .set(Self::default())
            .map_err(|_| "Config already initialized")
    }

    /// Initialise the global configuration from the environment
    ///
    /// # Errors
    ///
    /// Fails if the configuration was already initialised
    pub fn init_from_env() -> Result<(), &'static str> {
        GLOBAL_CONFIG
            .set(Self::from_env())
            .map_err(|_| "Config already initialized")
    }

    /// Initialise the global configuration with a custom instance
    ///
    /// # Errors
    ///
    /// Fails if the configuration was already initialised
    pub fn init_with(config: Config) -> Result<(), &'static str> {
        GLOBAL_CONFIG
            .set(config)
            .map_err(|_| "Config already initialized")
    }

    pub fn is_initialized() -> bool {
        GLOBAL_CONFIG.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cipher_suite, CipherSuite::Aes256Gcm);
        assert_eq!(config.story_ttl_secs, 86_400);
        assert_eq!(config.reply_think_time_ms, 800);
        assert!(!config.reply_fallback_text.is_empty());
    }

    #[test]
    fn test_global_config_is_stable() {
        let first = Config::global() as *const Config;
        let second = Config::global() as *const Config;
        assert_eq!(first, second);
        assert!(Config::is_initialized());
        assert!(Config::init().is_err());
    }
}
