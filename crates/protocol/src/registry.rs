//! Account → signing key bindings.
//!
//! An account moves from unregistered to registered exactly once; the first
//! key written wins and every later registration is rejected.

use alloy_primitives::Address;
use borsh::{BorshDeserialize, BorshSerialize};
use std::sync::Arc;

use crate::error::{ProtocolError, ProtocolResult};
use crate::store::{decode, encode, Put, StateStore};
use crate::types::RegistrationRecord;

const REGISTRY_KEY_PREFIX: &[u8] = b"registry/key/";

#[derive(BorshSerialize, BorshDeserialize)]
struct StoredRegistration {
    key: [u8; 20],
}

fn registry_key(account: Address) -> Vec<u8> {
    let mut key = Vec::with_capacity(REGISTRY_KEY_PREFIX.len() + 20);
    key.extend_from_slice(REGISTRY_KEY_PREFIX);
    key.extend_from_slice(account.as_slice());
    key
}

/// Read and write access to registration records.
pub struct Registry<S> {
    store: Arc<S>,
}

impl<S: StateStore> Registry<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The full record for `account`, if any.
    pub fn record(&self, account: Address) -> ProtocolResult<Option<RegistrationRecord>> {
        let Some(raw) = self.store.get(&registry_key(account))? else {
            return Ok(None);
        };
        let stored: StoredRegistration = decode(&raw)?;
        Ok(Some(RegistrationRecord {
            account,
            registered_key: Address::from(stored.key),
            registered: true,
        }))
    }

    pub fn is_registered(&self, account: Address) -> ProtocolResult<bool> {
        Ok(self.store.exists(&registry_key(account))?)
    }

    /// The key bound to `account`.
    pub fn key_of(&self, account: Address) -> ProtocolResult<Address> {
        self.record(account)?
            .map(|record| record.registered_key)
            .ok_or(ProtocolError::NotRegistered { account })
    }

    /// Bind `key` to `account`.
    ///
    /// Check and write are not atomic on their own; callers serialize through
    /// [`crate::KeyManager`].
    pub(crate) fn register(
        &self,
        account: Address,
        key: Address,
    ) -> ProtocolResult<RegistrationRecord> {
        let slot = registry_key(account);
        if self.store.exists(&slot)? {
            return Err(ProtocolError::AlreadyRegistered { account });
        }

        let value = encode(&StoredRegistration {
            key: key.into_array(),
        })?;
        self.store.apply(vec![Put::new(slot, value)])?;

        Ok(RegistrationRecord {
            account,
            registered_key: key,
            registered: true,
        })
    }
}
