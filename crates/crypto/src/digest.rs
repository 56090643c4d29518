//! Signing digest construction.
//!
//! A signer commits to `keccak256(payload_digest ‖ nonce)` and signs it as an
//! Ethereum personal message, so the verifier rebuilds the same value and
//! applies the same `"\x19Ethereum Signed Message:\n32"` prefix before
//! recovery.
//!
//! The payload digest of the fixed protocol domain is
//! `keccak256(abi.encode(words))`; with the default single zero word this is
//! [`DOMAIN_DIGEST`].

use alloy_primitives::{b256, eip191_hash_message, keccak256, B256};

use crate::nonce::Nonce;

/// `keccak256` of one zero `bytes32` word.
pub const DOMAIN_DIGEST: B256 =
    b256!("290decd9548b62a8d60345a988386fc84ba6bc95484008f6362f93160ef3e563");

/// The fixed application payload folded into every signing digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Domain {
    words: Vec<B256>,
    digest: B256,
}

impl Domain {
    /// Build a domain from its `bytes32` words.
    pub fn new(words: Vec<B256>) -> Self {
        let digest = abi_encoded_digest(&words);
        Self { words, digest }
    }

    pub fn words(&self) -> &[B256] {
        &self.words
    }

    /// `keccak256(abi.encode(words))`.
    pub fn digest(&self) -> B256 {
        self.digest
    }

    /// Signing digest for `nonce` under this domain.
    pub fn signing_digest(&self, nonce: &Nonce) -> B256 {
        signing_digest(self.digest, nonce)
    }
}

impl Default for Domain {
    fn default() -> Self {
        Self::new(vec![B256::ZERO])
    }
}

// Static `bytes32` values abi-encode to their plain concatenation.
fn abi_encoded_digest(words: &[B256]) -> B256 {
    let mut packed = Vec::with_capacity(words.len() * 32);
    for word in words {
        packed.extend_from_slice(word.as_slice());
    }
    keccak256(packed)
}

/// `keccak256(payload_digest ‖ nonce)`.
pub fn signing_digest(payload_digest: B256, nonce: &Nonce) -> B256 {
    let mut buf = [0u8; 64];
    let (head, tail) = buf.split_at_mut(32);
    head.copy_from_slice(payload_digest.as_slice());
    tail.copy_from_slice(nonce.as_slice());
    keccak256(buf)
}

/// The hash actually signed by a personal-message signer.
pub fn personal_message_hash(signing_digest: B256) -> B256 {
    eip191_hash_message(signing_digest)
}
