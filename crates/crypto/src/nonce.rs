//! Caller-chosen 32-byte nonces.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::B256;
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::error::{CryptoError, CryptoResult};

/// Length of the random alphanumeric nonce strings minted by [`Nonce::random`].
pub const RANDOM_NONCE_LEN: usize = 31;

/// Longest string [`Nonce::from_short_string`] accepts, leaving a zero byte.
pub const MAX_SHORT_STRING_LEN: usize = 31;

/// Opaque 32-byte value mixed into the signing digest.
///
/// The protocol never interprets a nonce as a counter; uniqueness is up to the
/// caller, replay safety is up to the verifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Nonce(B256);

impl Nonce {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(B256::new(bytes))
    }

    /// Encode a short string as a zero-padded word.
    ///
    /// At most 31 bytes are allowed so the word always ends in a zero byte,
    /// matching the `formatBytes32String` convention used by signing clients.
    pub fn from_short_string(s: &str) -> CryptoResult<Self> {
        let bytes = s.as_bytes();
        if bytes.len() > MAX_SHORT_STRING_LEN {
            return Err(CryptoError::NonceTooLong { len: bytes.len() });
        }
        let mut word = [0u8; 32];
        word.get_mut(..bytes.len())
            .ok_or(CryptoError::NonceTooLong { len: bytes.len() })?
            .copy_from_slice(bytes);
        Ok(Self::new(word))
    }

    /// Mint a fresh nonce from 31 random alphanumeric characters.
    pub fn random() -> Self {
        let text: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(RANDOM_NONCE_LEN)
            .map(char::from)
            .collect();
        let mut word = [0u8; 32];
        for (slot, byte) in word.iter_mut().zip(text.bytes()) {
            *slot = byte;
        }
        Self::new(word)
    }

    pub fn as_b256(&self) -> &B256 {
        &self.0
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl From<B256> for Nonce {
    fn from(word: B256) -> Self {
        Self(word)
    }
}

impl From<[u8; 32]> for Nonce {
    fn from(bytes: [u8; 32]) -> Self {
        Self::new(bytes)
    }
}

impl From<Nonce> for B256 {
    fn from(nonce: Nonce) -> Self {
        nonce.0
    }
}

impl FromStr for Nonce {
    type Err = CryptoError;

    /// Parse a `0x`-prefixed or bare 64-character hex word.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        B256::from_str(s)
            .map(Self)
            .map_err(|e| CryptoError::InvalidHex(e.to_string()))
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nonce({})", self.0)
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
