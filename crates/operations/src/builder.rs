//! Assembling a [`KeyManager`] from configuration.

use paperkey_protocol::{
    EventBus, JournalStore, KeyManager, MemoryStore, Put, StateStore, StoreResult,
};

use crate::config::{validate_config, ProtocolConfig, StorageBackend};
use crate::errors::ConfigError;

/// The store selected by `storage.backend`.
pub enum ConfiguredStore {
    Memory(MemoryStore),
    Journal(JournalStore),
}

impl ConfiguredStore {
    /// Open the backend described by `config`.
    pub fn open(config: &ProtocolConfig) -> Result<Self, ConfigError> {
        match config.storage.backend {
            StorageBackend::Memory => Ok(Self::Memory(MemoryStore::new())),
            StorageBackend::Journal => {
                let path = config.storage.path.as_deref().ok_or_else(|| {
                    ConfigError::ValidationFailed(vec![
                        "storage.path is required for the journal backend".to_string(),
                    ])
                })?;
                Ok(Self::Journal(JournalStore::open(path)?))
            }
        }
    }

    pub fn backend(&self) -> StorageBackend {
        match self {
            Self::Memory(_) => StorageBackend::Memory,
            Self::Journal(_) => StorageBackend::Journal,
        }
    }
}

impl StateStore for ConfiguredStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        match self {
            Self::Memory(store) => store.get(key),
            Self::Journal(store) => store.get(key),
        }
    }

    fn apply(&self, batch: Vec<Put>) -> StoreResult<()> {
        match self {
            Self::Memory(store) => store.apply(batch),
            Self::Journal(store) => store.apply(batch),
        }
    }
}

/// Validate `config` and build a manager over the configured store.
pub fn build_key_manager(
    config: &ProtocolConfig,
) -> Result<KeyManager<ConfiguredStore>, ConfigError> {
    validate_config(config)?;
    let domain = config.domain.to_domain()?;
    let store = ConfiguredStore::open(config)?;

    tracing::info!(
        backend = ?store.backend(),
        domain = %domain.digest(),
        channel_capacity = config.events.channel_capacity,
        "key manager ready"
    );

    Ok(KeyManager::new(
        store,
        domain,
        EventBus::new(config.events.channel_capacity),
    ))
}
