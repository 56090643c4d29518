//! Signature verification with replay protection.
//!
//! For a calling account the verifier:
//! 1. rebuilds `keccak256(payload_digest ‖ nonce)`,
//! 2. recovers the personal-message signer,
//! 3. requires the signer to be the account's registered key,
//! 4. rejects a replay key already in the ledger,
//! 5. records the replay key.

use alloy_primitives::{Address, B256};
use paperkey_crypto::{recover_personal_signer, signing_digest, Domain, Nonce, Signature};
use std::sync::Arc;

use crate::error::{ProtocolError, ProtocolResult};
use crate::ledger::ReplayLedger;
use crate::registry::Registry;
use crate::store::StateStore;
use crate::types::{ReplayKey, SignaturePayload, Verification};

/// Verifies signed nonces against the registry and consumes them.
pub struct Verifier<S> {
    domain: Domain,
    ledger: ReplayLedger<S>,
}

impl<S: StateStore> Verifier<S> {
    pub fn new(store: Arc<S>, domain: Domain) -> Self {
        Self {
            domain,
            ledger: ReplayLedger::new(store),
        }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn ledger(&self) -> &ReplayLedger<S> {
        &self.ledger
    }

    /// Payload for a fixed-domain verification.
    pub fn domain_payload(&self, nonce: Nonce, signature: &[u8]) -> SignaturePayload {
        SignaturePayload {
            digest: self.domain.digest(),
            nonce,
            signature: signature.to_vec(),
        }
    }

    /// Whether `signature` over `nonce` was already consumed for `account`.
    ///
    /// Malformed signatures were never consumed.
    pub fn is_consumed(
        &self,
        account: Address,
        nonce: &Nonce,
        signature: &[u8],
    ) -> ProtocolResult<bool> {
        match Signature::from_slice(signature) {
            Ok(signature) => self
                .ledger
                .is_consumed(&ReplayKey::derive(account, nonce, &signature)),
            Err(_) => Ok(false),
        }
    }

    /// Run the full check and consume the signature.
    ///
    /// Callers must serialize calls; see [`crate::KeyManager`].
    pub(crate) fn verify(
        &self,
        registry: &Registry<S>,
        account: Address,
        payload: &SignaturePayload,
    ) -> ProtocolResult<Verification> {
        let signature = Signature::from_slice(&payload.signature)?;
        let signer = recover_signer(payload.digest, &payload.nonce, &signature)?;

        match registry.record(account)? {
            Some(record) if record.registered_key == signer => {}
            _ => return Err(ProtocolError::NotRegistered { account }),
        }

        let replay_key = ReplayKey::derive(account, &payload.nonce, &signature);
        if self.ledger.is_consumed(&replay_key)? {
            return Err(ProtocolError::SignatureAlreadyUsed {
                account,
                nonce: payload.nonce,
            });
        }
        self.ledger.consume(&replay_key, account, &payload.nonce)?;

        Ok(Verification {
            account,
            nonce: payload.nonce,
            signer,
            replay_key,
        })
    }
}

fn recover_signer(
    payload_digest: B256,
    nonce: &Nonce,
    signature: &Signature,
) -> ProtocolResult<Address> {
    let digest = signing_digest(payload_digest, nonce);
    Ok(recover_personal_signer(digest, signature)?)
}
