//! End-to-end registration and verification flows.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::sync::{Arc, Barrier};
use std::thread;

use alloy_primitives::{Address, B256};
use paperkey_crypto::{Domain, LocalSigner, Nonce};
use paperkey_protocol::{
    Event, EventBus, JournalStore, KeyManager, MemoryStore, ProtocolError, StoreError,
};

fn registered_manager() -> (KeyManager, LocalSigner) {
    let manager = KeyManager::in_memory();
    let signer = LocalSigner::random();
    manager
        .register(signer.address(), signer.address())
        .expect("register");
    (manager, signer)
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_register_binds_key() {
    let manager = KeyManager::in_memory();
    let k1 = LocalSigner::random();
    let account = Address::repeat_byte(0x01);

    assert!(!manager.is_registered(account).unwrap());
    manager.register(account, k1.address()).unwrap();

    assert!(manager.is_registered(account).unwrap());
    assert_eq!(manager.key_of(account).unwrap(), k1.address());
}

#[test]
fn test_second_registration_keeps_first_key() {
    let manager = KeyManager::in_memory();
    let k1 = LocalSigner::random();
    let k2 = LocalSigner::random();
    let account = Address::repeat_byte(0x01);

    manager.register(account, k1.address()).unwrap();
    let err = manager.register(account, k2.address()).unwrap_err();

    assert!(matches!(err, ProtocolError::AlreadyRegistered { account: a } if a == account));
    assert_eq!(manager.key_of(account).unwrap(), k1.address());
}

#[test]
fn test_same_key_reregistration_rejected() {
    let (manager, signer) = registered_manager();
    assert!(matches!(
        manager.register(signer.address(), signer.address()),
        Err(ProtocolError::AlreadyRegistered { .. })
    ));
}

// ============================================================================
// Verification
// ============================================================================

#[test]
fn test_verify_then_replay() {
    let (manager, signer) = registered_manager();
    let mut events = manager.subscribe();
    let account = signer.address();

    let signed = signer.sign_fresh_nonce(manager.domain()).unwrap();
    let sig = signed.signature.to_bytes();

    let verification = manager.verify(account, signed.nonce, sig).unwrap();
    assert_eq!(verification.signer, account);
    assert_eq!(
        events.try_recv().unwrap(),
        Event::Verified {
            account,
            nonce: signed.nonce
        }
    );

    let err = manager.verify(account, signed.nonce, sig).unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::SignatureAlreadyUsed { nonce, .. } if nonce == signed.nonce
    ));
    assert!(events.try_recv().is_err());
}

#[test]
fn test_fresh_nonce_verifies_after_replay() {
    let (manager, signer) = registered_manager();
    let account = signer.address();

    let first = signer.sign_fresh_nonce(manager.domain()).unwrap();
    manager
        .verify(account, first.nonce, first.signature.to_bytes())
        .unwrap();
    assert!(manager
        .verify(account, first.nonce, first.signature.to_bytes())
        .is_err());

    let second = signer.sign_fresh_nonce(manager.domain()).unwrap();
    assert_ne!(first.nonce, second.nonce);
    manager
        .verify(account, second.nonce, second.signature.to_bytes())
        .unwrap();
}

#[test]
fn test_unregistered_signer_rejected() {
    let (manager, signer) = registered_manager();
    let stranger = LocalSigner::random();

    let signed = stranger.sign_fresh_nonce(manager.domain()).unwrap();
    let sig = signed.signature.to_bytes();

    assert!(matches!(
        manager.verify(signer.address(), signed.nonce, sig),
        Err(ProtocolError::NotRegistered { .. })
    ));
    assert!(matches!(
        manager.verify(stranger.address(), signed.nonce, sig),
        Err(ProtocolError::NotRegistered { .. })
    ));
    assert!(!manager
        .is_consumed(signer.address(), &signed.nonce, sig)
        .unwrap());
}

#[test]
fn test_rejected_replay_does_not_consume_for_other_account() {
    let manager = KeyManager::in_memory();
    let signer = LocalSigner::random();
    let a = Address::repeat_byte(0xa0);
    let b = Address::repeat_byte(0xb0);
    manager.register(a, signer.address()).unwrap();
    manager.register(b, signer.address()).unwrap();

    let signed = signer.sign_fresh_nonce(manager.domain()).unwrap();
    let sig = signed.signature.to_bytes();
    manager.verify(a, signed.nonce, sig).unwrap();
    // Replay keys are scoped to the verifying account.
    manager.verify(b, signed.nonce, sig).unwrap();
    assert!(manager.verify(a, signed.nonce, sig).is_err());
    assert!(manager.verify(b, signed.nonce, sig).is_err());
}

#[test]
fn test_domain_mismatch_reports_not_registered() {
    let signer = LocalSigner::random();
    let manager = KeyManager::new(
        MemoryStore::new(),
        Domain::new(vec![B256::repeat_byte(0x01)]),
        EventBus::default(),
    );
    manager
        .register(signer.address(), signer.address())
        .unwrap();

    let signed = signer.sign_fresh_nonce(&Domain::default()).unwrap();
    assert!(matches!(
        manager.verify(signer.address(), signed.nonce, signed.signature.to_bytes()),
        Err(ProtocolError::NotRegistered { .. })
    ));
}

#[test]
fn test_short_string_nonce_flow() {
    let (manager, signer) = registered_manager();
    let nonce = Nonce::from_short_string("aZ3kLm9QxP2vB7nR5tY8wE1uI4oA6sD").unwrap();
    let signed = signer.sign_nonce(manager.domain(), nonce).unwrap();
    manager
        .verify(signer.address(), nonce, signed.signature.to_bytes())
        .unwrap();
}

#[test]
fn test_hex_signature_input() {
    let (manager, signer) = registered_manager();
    let signed = signer.sign_fresh_nonce(manager.domain()).unwrap();
    let hex = signed.signature.to_string();
    let parsed: paperkey_crypto::Signature = hex.parse().unwrap();
    manager
        .verify(signer.address(), signed.nonce, parsed.to_bytes())
        .unwrap();
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_racing_registrations_single_winner() {
    const THREADS: usize = 8;
    let manager = Arc::new(KeyManager::in_memory());
    let account = Address::repeat_byte(0x42);
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let manager = manager.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                let key = LocalSigner::random().address();
                barrier.wait();
                manager.register(account, key).map(|r| r.registered_key)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);
    assert_eq!(manager.key_of(account).unwrap(), *winners[0]);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, ProtocolError::AlreadyRegistered { .. })));
}

#[test]
fn test_racing_verifications_single_winner() {
    const THREADS: usize = 8;
    let (manager, signer) = registered_manager();
    let manager = Arc::new(manager);
    let signed = signer.sign_fresh_nonce(manager.domain()).unwrap();
    let sig = signed.signature.to_bytes();
    let account = signer.address();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let manager = manager.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                manager.verify(account, signed.nonce, sig)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, ProtocolError::SignatureAlreadyUsed { .. })));
}

// ============================================================================
// Durability
// ============================================================================

#[test]
fn test_journal_backed_manager_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let signer = LocalSigner::random();
    let account = signer.address();
    let signed = signer.sign_fresh_nonce(&Domain::default()).unwrap();
    let sig = signed.signature.to_bytes();

    {
        let store = JournalStore::open(dir.path()).unwrap();
        let manager = KeyManager::new(store, Domain::default(), EventBus::default());
        manager.register(account, signer.address()).unwrap();
        manager.verify(account, signed.nonce, sig).unwrap();
    }

    let store = JournalStore::open(dir.path()).unwrap();
    let manager = KeyManager::new(store, Domain::default(), EventBus::default());

    assert_eq!(manager.key_of(account).unwrap(), signer.address());
    assert!(manager.is_consumed(account, &signed.nonce, sig).unwrap());
    assert!(matches!(
        manager.register(account, Address::ZERO),
        Err(ProtocolError::AlreadyRegistered { .. })
    ));
    assert!(matches!(
        manager.verify(account, signed.nonce, sig),
        Err(ProtocolError::SignatureAlreadyUsed { .. })
    ));
}

#[test]
fn test_second_manager_on_same_journal_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let first = KeyManager::new(
        JournalStore::open(dir.path()).unwrap(),
        Domain::default(),
        EventBus::default(),
    );
    let account = Address::repeat_byte(0x0a);

    assert!(matches!(
        JournalStore::open(dir.path()),
        Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::WouldBlock
    ));

    first.register(account, Address::repeat_byte(0x01)).unwrap();
    drop(first);

    let second = KeyManager::new(
        JournalStore::open(dir.path()).unwrap(),
        Domain::default(),
        EventBus::default(),
    );
    assert!(matches!(
        second.register(account, Address::repeat_byte(0x02)),
        Err(ProtocolError::AlreadyRegistered { .. })
    ));
    assert_eq!(second.key_of(account).unwrap(), Address::repeat_byte(0x01));
}
