use parking_lot::RwLock;
use std::collections::BTreeMap;

use super::{Put, StateStore, StoreResult};

/// Process-local store. State is lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.state.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().is_empty()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.state.read().get(key).cloned())
    }

    fn apply(&self, batch: Vec<Put>) -> StoreResult<()> {
        let mut guard = self.state.write();
        for put in batch {
            guard.insert(put.key, put.value);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_get_after_apply() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get(b"a").unwrap(), None);

        store
            .apply(vec![
                Put::new(b"a".to_vec(), b"1".to_vec()),
                Put::new(b"b".to_vec(), b"2".to_vec()),
            ])
            .unwrap();

        assert_eq!(store.get(b"a").unwrap(), Some(b"1".to_vec()));
        assert!(store.exists(b"b").unwrap());
        assert!(!store.exists(b"c").unwrap());
        assert_eq!(store.len(), 2);
    }
}
