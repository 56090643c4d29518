//! Append-only record of consumed signatures.

use alloy_primitives::Address;
use borsh::{BorshDeserialize, BorshSerialize};
use paperkey_crypto::Nonce;
use std::sync::Arc;

use crate::error::ProtocolResult;
use crate::store::{encode, Put, StateStore};
use crate::types::ReplayKey;

const LEDGER_KEY_PREFIX: &[u8] = b"ledger/used/";

#[derive(BorshSerialize, BorshDeserialize)]
struct ConsumedEntry {
    account: [u8; 20],
    nonce: [u8; 32],
}

fn ledger_key(replay_key: &ReplayKey) -> Vec<u8> {
    let mut key = Vec::with_capacity(LEDGER_KEY_PREFIX.len() + 32);
    key.extend_from_slice(LEDGER_KEY_PREFIX);
    key.extend_from_slice(replay_key.as_b256().as_slice());
    key
}

/// Tracks which replay keys have been consumed. Entries are never removed.
pub struct ReplayLedger<S> {
    store: Arc<S>,
}

impl<S: StateStore> ReplayLedger<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn is_consumed(&self, replay_key: &ReplayKey) -> ProtocolResult<bool> {
        Ok(self.store.exists(&ledger_key(replay_key))?)
    }

    /// Mark `replay_key` consumed.
    pub(crate) fn consume(
        &self,
        replay_key: &ReplayKey,
        account: Address,
        nonce: &Nonce,
    ) -> ProtocolResult<()> {
        let value = encode(&ConsumedEntry {
            account: account.into_array(),
            nonce: nonce.as_b256().0,
        })?;
        self.store.apply(vec![Put::new(ledger_key(replay_key), value)])?;
        Ok(())
    }
}
