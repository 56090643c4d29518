//! Entry point for registration and verification.
//!
//! Every mutating call runs under one global lock: check, write and event
//! publication happen as a unit, so two racing registrations of the same
//! account, or two racing verifications of the same signature, cannot both
//! succeed. Reads go straight to the store and observe committed state only.

use alloy_primitives::{Address, B256};
use paperkey_crypto::{Domain, Nonce};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::error::{ProtocolError, ProtocolResult};
use crate::events::{Event, EventBus, EventSink};
use crate::registry::Registry;
use crate::store::{MemoryStore, StateStore};
use crate::types::{RegistrationRecord, SignaturePayload, Verification};
use crate::verifier::Verifier;

/// Key registration and replay-protected verification over a [`StateStore`].
pub struct KeyManager<S = MemoryStore> {
    registry: Registry<S>,
    verifier: Verifier<S>,
    events: EventBus,
    write_lock: Mutex<()>,
}

impl KeyManager<MemoryStore> {
    /// Process-local manager with the default domain.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new(), Domain::default(), EventBus::default())
    }
}

impl<S: StateStore> KeyManager<S> {
    pub fn new(store: S, domain: Domain, events: EventBus) -> Self {
        let store = Arc::new(store);
        Self {
            registry: Registry::new(store.clone()),
            verifier: Verifier::new(store, domain),
            events,
            write_lock: Mutex::new(()),
        }
    }

    /// Bind `key` to `account`. Fails with `AlreadyRegistered` if the account
    /// already has a key, whatever that key is.
    pub fn register(&self, account: Address, key: Address) -> ProtocolResult<RegistrationRecord> {
        let _guard = self.write_lock.lock();
        match self.registry.register(account, key) {
            Ok(record) => {
                tracing::debug!(%account, %key, "registered key");
                self.events.publish(Event::Registered { account, key });
                Ok(record)
            }
            Err(err) => {
                log_rejection(account, &err);
                Err(err)
            }
        }
    }

    /// Verify a signed nonce under the fixed domain on behalf of `account`.
    pub fn verify(
        &self,
        account: Address,
        nonce: Nonce,
        signature: impl AsRef<[u8]>,
    ) -> ProtocolResult<Verification> {
        let payload = self.verifier.domain_payload(nonce, signature.as_ref());
        self.verify_signed_payload(account, &payload)
    }

    /// Verify a signed nonce over an arbitrary payload digest.
    pub fn verify_payload(
        &self,
        account: Address,
        payload_digest: B256,
        nonce: Nonce,
        signature: impl AsRef<[u8]>,
    ) -> ProtocolResult<Verification> {
        let payload = SignaturePayload {
            digest: payload_digest,
            nonce,
            signature: signature.as_ref().to_vec(),
        };
        self.verify_signed_payload(account, &payload)
    }

    /// Verify an assembled [`SignaturePayload`].
    pub fn verify_signed_payload(
        &self,
        account: Address,
        payload: &SignaturePayload,
    ) -> ProtocolResult<Verification> {
        let _guard = self.write_lock.lock();
        match self.verifier.verify(&self.registry, account, payload) {
            Ok(verification) => {
                tracing::debug!(%account, nonce = %payload.nonce, "verified signature");
                self.events.publish(Event::Verified {
                    account,
                    nonce: payload.nonce,
                });
                Ok(verification)
            }
            Err(err) => {
                log_rejection(account, &err);
                Err(err)
            }
        }
    }

    pub fn is_registered(&self, account: Address) -> ProtocolResult<bool> {
        self.registry.is_registered(account)
    }

    pub fn key_of(&self, account: Address) -> ProtocolResult<Address> {
        self.registry.key_of(account)
    }

    pub fn record(&self, account: Address) -> ProtocolResult<Option<RegistrationRecord>> {
        self.registry.record(account)
    }

    /// Whether this exact (account, nonce, signature) was already accepted.
    pub fn is_consumed(
        &self,
        account: Address,
        nonce: &Nonce,
        signature: impl AsRef<[u8]>,
    ) -> ProtocolResult<bool> {
        self.verifier.is_consumed(account, nonce, signature.as_ref())
    }

    pub fn domain(&self) -> &Domain {
        self.verifier.domain()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub fn add_sink(&self, sink: Arc<dyn EventSink>) {
        self.events.add_sink(sink);
    }
}

fn log_rejection(account: Address, err: &ProtocolError) {
    match err {
        ProtocolError::Storage(e) => tracing::error!(%account, error = %e, "store failure"),
        ProtocolError::AlreadyRegistered { .. } | ProtocolError::SignatureAlreadyUsed { .. } => {
            tracing::warn!(%account, error = %err, "rejected")
        }
        _ => tracing::debug!(%account, error = %err, "rejected"),
    }
}
