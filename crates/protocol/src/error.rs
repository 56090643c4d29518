//! Protocol error types.

use alloy_primitives::Address;
use paperkey_crypto::{CryptoError, Nonce};
use thiserror::Error;

use crate::store::StoreError;

/// Errors returned by registration and verification.
///
/// Every variant leaves registry and ledger state untouched.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The account already has a bound key.
    #[error("account {account} already registered")]
    AlreadyRegistered { account: Address },

    /// No key is bound to the account, or the signature was made by a
    /// different key than the one bound.
    #[error("account {account} not registered")]
    NotRegistered { account: Address },

    /// The (account, nonce, signature) triple was already consumed.
    #[error("signature already used for account {account} and nonce {nonce}")]
    SignatureAlreadyUsed { account: Address, nonce: Nonce },

    /// Signature bytes are malformed or do not recover to any key.
    #[error("invalid signature: {0}")]
    InvalidSignature(#[from] CryptoError),

    /// The backing store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
