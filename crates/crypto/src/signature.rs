//! 65-byte `r ‖ s ‖ v` personal-message signatures.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{PrimitiveSignature, B256, U256};

use crate::error::{CryptoError, CryptoResult};

/// Encoded signature length.
pub const SIGNATURE_LEN: usize = 65;

/// A validated recoverable ECDSA signature.
///
/// Construction enforces `v ∈ {27, 28}` and low `s`, so every accepted
/// signature has exactly one byte encoding.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature(PrimitiveSignature);

impl Signature {
    /// Parse `r ‖ s ‖ v` bytes.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(CryptoError::InvalidSignatureLength {
                expected: SIGNATURE_LEN,
                actual: bytes.len(),
            });
        }
        let v = bytes.last().copied().unwrap_or_default();
        check_v(v)?;
        let inner =
            PrimitiveSignature::from_raw(bytes).map_err(|_| CryptoError::InvalidRecoveryId(v))?;
        Self::canonical(inner)
    }

    /// Build from components, applying the same checks as [`Self::from_slice`].
    pub fn from_parts(r: B256, s: B256, v: u8) -> CryptoResult<Self> {
        check_v(v)?;
        let inner = PrimitiveSignature::new(
            U256::from_be_bytes(r.0),
            U256::from_be_bytes(s.0),
            v == 28,
        );
        Self::canonical(inner)
    }

    fn canonical(inner: PrimitiveSignature) -> CryptoResult<Self> {
        // `normalize_s` only yields a value when `s` is in the upper half.
        if inner.normalize_s().is_some() {
            return Err(CryptoError::NonCanonicalSignature);
        }
        Ok(Self(inner))
    }

    pub fn inner(&self) -> &PrimitiveSignature {
        &self.0
    }

    pub fn r(&self) -> B256 {
        B256::from(self.0.r().to_be_bytes::<32>())
    }

    pub fn s(&self) -> B256 {
        B256::from(self.0.s().to_be_bytes::<32>())
    }

    pub fn v(&self) -> u8 {
        27 + self.recovery_id()
    }

    /// Recovery id in `0..=1` as understood by secp256k1.
    pub fn recovery_id(&self) -> u8 {
        u8::from(self.0.v())
    }

    /// The 64-byte compact `r ‖ s` form.
    pub fn compact(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        let (r, s) = out.split_at_mut(32);
        r.copy_from_slice(&self.0.r().to_be_bytes::<32>());
        s.copy_from_slice(&self.0.s().to_be_bytes::<32>());
        out
    }

    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        let mut out = [0u8; SIGNATURE_LEN];
        let (rs, v) = out.split_at_mut(64);
        rs.copy_from_slice(&self.compact());
        if let Some(slot) = v.first_mut() {
            *slot = self.v();
        }
        out
    }
}

fn check_v(v: u8) -> CryptoResult<()> {
    if v == 27 || v == 28 {
        Ok(())
    } else {
        Err(CryptoError::InvalidRecoveryId(v))
    }
}

impl From<Signature> for PrimitiveSignature {
    fn from(signature: Signature) -> Self {
        signature.0
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = CryptoError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_slice(bytes)
    }
}

impl FromStr for Signature {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_bytes()))
    }
}
