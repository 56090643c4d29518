//! Errors produced while parsing signatures and recovering signers.

use thiserror::Error;

/// Errors that can occur in signature handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Signature bytes are not `r ‖ s ‖ v`.
    #[error("invalid signature length: expected {expected}, got {actual}")]
    InvalidSignatureLength { expected: usize, actual: usize },

    /// The `v` byte is not 27 or 28.
    #[error("invalid recovery id {0}: expected 27 or 28")]
    InvalidRecoveryId(u8),

    /// The `s` value lies in the upper half of the curve order.
    #[error("non-canonical signature: s is in the upper half of the curve order")]
    NonCanonicalSignature,

    /// secp256k1 rejected the signature or could not recover a key.
    #[error("failed to recover signer from signature")]
    RecoveryFailed,

    /// Hex input could not be decoded.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Nonce string does not fit a 32-byte word with a terminating zero.
    #[error("nonce string too long: {len} bytes, at most 31 allowed")]
    NonceTooLong { len: usize },

    /// The local signer failed to produce a signature.
    #[error("signing failed: {0}")]
    SigningFailed(String),
}

/// Result type for signature handling.
pub type CryptoResult<T> = Result<T, CryptoError>;
