//! Key registration and replay-protected signature verification.
//!
//! Accounts bind a secp256k1 signing key once. Afterwards, an account can
//! present a nonce signed by that key as an Ethereum personal message; each
//! (account, nonce, signature) triple is accepted at most once.
//!
//! # Usage
//!
//! ```
//! use paperkey_crypto::LocalSigner;
//! use paperkey_protocol::{KeyManager, ProtocolError};
//!
//! let manager = KeyManager::in_memory();
//! let signer = LocalSigner::random();
//! let account = signer.address();
//!
//! manager.register(account, signer.address()).unwrap();
//!
//! let signed = signer.sign_fresh_nonce(manager.domain()).unwrap();
//! let sig = signed.signature.to_bytes();
//! manager.verify(account, signed.nonce, sig).unwrap();
//!
//! assert!(matches!(
//!     manager.verify(account, signed.nonce, sig),
//!     Err(ProtocolError::SignatureAlreadyUsed { .. })
//! ));
//! ```
//!
//! # Architecture
//!
//! 1. [`Registry`] - account → key bindings, first write wins
//! 2. [`ReplayLedger`] - append-only set of consumed replay keys
//! 3. [`Verifier`] - digest rebuild, signer recovery, key match, replay check
//! 4. [`KeyManager`] - serializes calls and publishes [`Event`]s after commit
//! 5. [`store`] - in-memory or journal-backed state

pub mod error;
pub mod events;
pub mod ledger;
pub mod manager;
pub mod registry;
pub mod store;
pub mod types;
pub mod verifier;

pub use error::{ProtocolError, ProtocolResult};
pub use events::{Event, EventBus, EventLog, EventSink, DEFAULT_EVENT_CAPACITY};
pub use ledger::ReplayLedger;
pub use manager::KeyManager;
pub use registry::Registry;
pub use store::{JournalStore, MemoryStore, Put, StateStore, StoreError, StoreResult};
pub use types::{RegistrationRecord, ReplayKey, SignaturePayload, Verification};
pub use verifier::Verifier;
