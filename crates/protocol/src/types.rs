//! Records and keys shared by the registry, the ledger and the manager.

use alloy_primitives::{keccak256, Address, B256};
use paperkey_crypto::{Nonce, Signature};

/// Binding of an account to its signing key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistrationRecord {
    pub account: Address,
    pub registered_key: Address,
    pub registered: bool,
}

/// The inputs to one verification call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignaturePayload {
    /// Application payload digest; the fixed domain digest for plain `verify`.
    pub digest: B256,
    pub nonce: Nonce,
    pub signature: Vec<u8>,
}

/// Outcome of a successful verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verification {
    pub account: Address,
    pub nonce: Nonce,
    pub signer: Address,
    pub replay_key: ReplayKey,
}

/// Identifies one consumed (account, nonce, signature) triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReplayKey(B256);

impl ReplayKey {
    /// `keccak256(account ‖ nonce ‖ signature)`.
    pub fn derive(account: Address, nonce: &Nonce, signature: &Signature) -> Self {
        let mut buf = Vec::with_capacity(20 + 32 + paperkey_crypto::SIGNATURE_LEN);
        buf.extend_from_slice(account.as_slice());
        buf.extend_from_slice(nonce.as_slice());
        buf.extend_from_slice(&signature.to_bytes());
        Self(keccak256(buf))
    }

    pub fn as_b256(&self) -> &B256 {
        &self.0
    }
}
