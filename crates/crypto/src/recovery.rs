use alloy_primitives::{keccak256, Address, B256};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{All, Message, PublicKey, Secp256k1};
use std::sync::OnceLock;

use crate::digest::personal_message_hash;
use crate::error::{CryptoError, CryptoResult};
use crate::signature::Signature;

/// Recover the address that produced `signature` over the 32-byte `hash`.
///
/// No prefix is applied; `hash` must be exactly what the signer signed.
pub fn recover_address_from_hash(hash: B256, signature: &Signature) -> CryptoResult<Address> {
    let recid = RecoveryId::from_i32(i32::from(signature.recovery_id()))
        .map_err(|_| CryptoError::RecoveryFailed)?;
    let recoverable = RecoverableSignature::from_compact(&signature.compact(), recid)
        .map_err(|_| CryptoError::RecoveryFailed)?;

    let msg = Message::from_digest(hash.0);
    let pubkey = secp()
        .recover_ecdsa(&msg, &recoverable)
        .map_err(|_| CryptoError::RecoveryFailed)?;
    public_key_to_address(&pubkey)
}

/// Recover the signer of a personal message whose body is `signing_digest`.
pub fn recover_personal_signer(
    signing_digest: B256,
    signature: &Signature,
) -> CryptoResult<Address> {
    recover_address_from_hash(personal_message_hash(signing_digest), signature)
}

/// Ethereum address of an uncompressed secp256k1 public key.
pub fn public_key_to_address(pubkey: &PublicKey) -> CryptoResult<Address> {
    let uncompressed = pubkey.serialize_uncompressed();
    address_from_uncompressed(&uncompressed)
}

fn address_from_uncompressed(uncompressed: &[u8]) -> CryptoResult<Address> {
    let pubkey_payload = uncompressed.get(1..).ok_or(CryptoError::RecoveryFailed)?;
    let hash = keccak256(pubkey_payload);
    let address_bytes = hash.as_slice().get(12..).ok_or(CryptoError::RecoveryFailed)?;
    Ok(Address::from_slice(address_bytes))
}

fn secp() -> &'static Secp256k1<All> {
    static SECP: OnceLock<Secp256k1<All>> = OnceLock::new();
    SECP.get_or_init(Secp256k1::new)
}
