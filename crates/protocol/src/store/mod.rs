//! Key-value state backing the registry and the replay ledger.
//!
//! Protocol state is append-only, so stores only ever receive puts. A batch
//! passed to [`StateStore::apply`] must become visible all at once or not at
//! all.

mod journal;
mod memory;

pub use journal::{JournalStore, MAX_PAYLOAD_LEN};
pub use memory::MemoryStore;

use thiserror::Error;

/// Errors raised by a [`StateStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying file I/O failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(String),

    /// A complete journal frame failed its checksum.
    #[error("journal corrupted at offset {offset}")]
    Corrupt { offset: u64 },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A single key write.
#[derive(Debug, Clone, PartialEq, Eq, borsh::BorshSerialize, borsh::BorshDeserialize)]
pub struct Put {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl Put {
    pub fn new(key: Vec<u8>, value: Vec<u8>) -> Self {
        Self { key, value }
    }
}

/// Storage backend for protocol state.
pub trait StateStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Apply a batch of puts atomically.
    fn apply(&self, batch: Vec<Put>) -> StoreResult<()>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}

pub(crate) fn encode<T: borsh::BorshSerialize + ?Sized>(value: &T) -> StoreResult<Vec<u8>> {
    borsh::to_vec(value).map_err(|e| StoreError::Codec(e.to_string()))
}

pub(crate) fn decode<T: borsh::BorshDeserialize>(bytes: &[u8]) -> StoreResult<T> {
    borsh::from_slice(bytes).map_err(|e| StoreError::Codec(e.to_string()))
}
