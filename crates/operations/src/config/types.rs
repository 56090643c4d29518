//! Configuration types for the key manager.

use alloy_primitives::B256;
use paperkey_crypto::Domain;
use paperkey_protocol::DEFAULT_EVENT_CAPACITY;
use serde::Deserialize;

use crate::errors::ConfigError;

/// Root configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProtocolConfig {
    /// Domain folded into every signing digest.
    #[serde(default)]
    pub domain: DomainConfig,

    /// Where registrations and consumed signatures are kept.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Event delivery configuration.
    #[serde(default)]
    pub events: EventsConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Signing domain as a list of hex-encoded `bytes32` words.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainConfig {
    /// Default: a single zero word.
    #[serde(default = "DomainConfig::default_words")]
    pub words: Vec<String>,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            words: Self::default_words(),
        }
    }
}

impl DomainConfig {
    fn default_words() -> Vec<String> {
        vec![B256::ZERO.to_string()]
    }

    /// Parse the configured words into a [`Domain`].
    pub fn to_domain(&self) -> Result<Domain, ConfigError> {
        let mut words = Vec::with_capacity(self.words.len());
        let mut errors = Vec::new();
        for (i, word) in self.words.iter().enumerate() {
            match parse_word(i, word) {
                Ok(w) => words.push(w),
                Err(e) => errors.push(e),
            }
        }
        if errors.is_empty() {
            Ok(Domain::new(words))
        } else {
            Err(ConfigError::ValidationFailed(errors))
        }
    }
}

pub(crate) fn parse_word(index: usize, word: &str) -> Result<B256, String> {
    word.parse::<B256>().map_err(|_| {
        format!("domain.words[{index}] '{word}' is not a 32-byte hex word")
    })
}

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local state, lost on restart.
    #[default]
    Memory,
    /// Append-only journal file under `storage.path`.
    Journal,
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory for the journal. Required for the journal backend.
    #[serde(default)]
    pub path: Option<String>,
}

/// Event delivery configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventsConfig {
    /// Broadcast buffer per subscriber. Default: 256.
    #[serde(default = "EventsConfig::default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: Self::default_channel_capacity(),
        }
    }
}

impl EventsConfig {
    const fn default_channel_capacity() -> usize {
        DEFAULT_EVENT_CAPACITY
    }
}

/// Observability configuration for logging.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservabilityConfig {
    /// Log level: trace, debug, info, warn, error, off. Default: info.
    #[serde(default = "ObservabilityConfig::default_log_level")]
    pub log_level: String,

    /// Log format: json or pretty. Default: json.
    #[serde(default = "ObservabilityConfig::default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            log_format: Self::default_log_format(),
        }
    }
}

impl ObservabilityConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }

    fn default_log_format() -> String {
        "json".to_string()
    }
}
