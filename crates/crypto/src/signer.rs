//! In-process secp256k1 signer.
//!
//! Produces the same signatures an Ethereum wallet's `signMessage` would for a
//! 32-byte digest, so off-chain clients and tests can drive the verifier
//! without a wallet.

use alloy_primitives::{Address, B256};
use k256::ecdsa::{signature::hazmat::PrehashSigner, RecoveryId, SigningKey};
use rand::rngs::OsRng;

use crate::digest::{personal_message_hash, Domain};
use crate::error::{CryptoError, CryptoResult};
use crate::nonce::Nonce;
use crate::signature::Signature;

/// A nonce together with the signature that commits to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignedNonce {
    pub nonce: Nonce,
    pub signing_digest: B256,
    pub signature: Signature,
}

/// Holds a secp256k1 private key.
#[derive(Clone)]
pub struct LocalSigner {
    key: SigningKey,
    address: Address,
}

impl LocalSigner {
    /// Generate a fresh random key.
    pub fn random() -> Self {
        Self::from_key(SigningKey::random(&mut OsRng))
    }

    /// Load a 32-byte big-endian private scalar.
    pub fn from_bytes(secret: &[u8; 32]) -> CryptoResult<Self> {
        let key = SigningKey::from_slice(secret)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        Ok(Self::from_key(key))
    }

    fn from_key(key: SigningKey) -> Self {
        let address = Address::from_public_key(key.verifying_key());
        Self { key, address }
    }

    /// Address derived from the public key.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign `hash` as-is, without any message prefix.
    pub fn sign_hash(&self, hash: B256) -> CryptoResult<Signature> {
        let (sig, recovery_id): (k256::ecdsa::Signature, RecoveryId) = self
            .key
            .sign_prehash(hash.as_slice())
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        let r = B256::from_slice(&sig.r().to_bytes());
        let s = B256::from_slice(&sig.s().to_bytes());
        Signature::from_parts(r, s, 27 + recovery_id.to_byte())
    }

    /// Sign a 32-byte digest as a personal message (`signMessage(bytes)`).
    pub fn sign_personal_digest(&self, digest: B256) -> CryptoResult<Signature> {
        self.sign_hash(personal_message_hash(digest))
    }

    /// Sign `nonce` under `domain`.
    pub fn sign_nonce(&self, domain: &Domain, nonce: Nonce) -> CryptoResult<SignedNonce> {
        let signing_digest = domain.signing_digest(&nonce);
        let signature = self.sign_personal_digest(signing_digest)?;
        Ok(SignedNonce {
            nonce,
            signing_digest,
            signature,
        })
    }

    /// Mint a random nonce and sign it under `domain`.
    pub fn sign_fresh_nonce(&self, domain: &Domain) -> CryptoResult<SignedNonce> {
        self.sign_nonce(domain, Nonce::random())
    }
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
