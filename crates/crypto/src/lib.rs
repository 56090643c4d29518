//! Cryptographic primitives for the PaperKey protocol.
//!
//! - [`digest`]: domain payload and signing digest construction
//! - [`signature`]: canonical 65-byte `r ‖ s ‖ v` signatures
//! - [`recovery`]: secp256k1 signer recovery to Ethereum addresses
//! - [`signer`]: an in-process signer for clients and tests
//! - [`nonce`]: opaque 32-byte nonces
//!
//! ```
//! use paperkey_crypto::{recover_personal_signer, Domain, LocalSigner};
//!
//! let signer = LocalSigner::random();
//! let signed = signer.sign_fresh_nonce(&Domain::default()).unwrap();
//! let recovered = recover_personal_signer(signed.signing_digest, &signed.signature).unwrap();
//! assert_eq!(recovered, signer.address());
//! ```

pub mod digest;
pub mod error;
pub mod nonce;
pub mod recovery;
pub mod signature;
pub mod signer;

pub use alloy_primitives::{Address, B256};
pub use digest::{personal_message_hash, signing_digest, Domain, DOMAIN_DIGEST};
pub use error::{CryptoError, CryptoResult};
pub use nonce::{Nonce, MAX_SHORT_STRING_LEN, RANDOM_NONCE_LEN};
pub use recovery::{public_key_to_address, recover_address_from_hash, recover_personal_signer};
pub use signature::{Signature, SIGNATURE_LEN};
pub use signer::{LocalSigner, SignedNonce};
