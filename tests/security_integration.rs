//! Exercises the security module's public API directly (no FFI layer
//! exists in this crate): key-version registration/rotation lifecycle and
//! the zeroizing buffer types working together the way `account::store`
//! actually uses them.

use lockbox_core::security::key_rotation::{KeyRotationManager, KeyStatus, KeyType};
use lockbox_core::security::secure_memory::{secure_compare, SecureBuffer};

#[test]
fn key_registration_assigns_increasing_versions_per_key_type() {
    let manager = KeyRotationManager::new();
    let first = manager
        .register_key_version("wallet-a", KeyType::EncryptionKey, None, "AES-256-GCM")
        .unwrap();
    assert_eq!(first.version, 1);
    assert_eq!(first.status, KeyStatus::Active);

    let second = manager
        .register_key_version("wallet-a", KeyType::EncryptionKey, None, "AES-256-GCM")
        .unwrap();
    assert_eq!(second.version, 2);

    // A different key type on the same wallet starts its own sequence.
    let signing = manager
        .register_key_version("wallet-a", KeyType::SigningKey, Some("m/84'/0'/0'"), "secp256k1")
        .unwrap();
    assert_eq!(signing.version, 1);

    assert_eq!(manager.get_all_versions("wallet-a").len(), 3);
}

#[test]
fn deprecating_a_version_leaves_the_newer_one_active() {
    let manager = KeyRotationManager::new();
    manager
        .register_key_version("wallet-b", KeyType::EncryptionKey, None, "AES-256-GCM")
        .unwrap();
    let v2 = manager
        .register_key_version("wallet-b", KeyType::EncryptionKey, None, "AES-256-GCM")
        .unwrap();

    manager
        .deprecate_version("wallet-b", KeyType::EncryptionKey, 1, "scheduled rotation")
        .unwrap();

    let active = manager.get_active_version("wallet-b", KeyType::EncryptionKey).unwrap();
    assert_eq!(active.version, v2.version);
}

#[test]
fn compromised_keys_cannot_be_deprecated_instead() {
    let manager = KeyRotationManager::new();
    manager
        .register_key_version("wallet-c", KeyType::MasterSeed, None, "BIP39")
        .unwrap();
    manager
        .mark_compromised("wallet-c", KeyType::MasterSeed, 1)
        .unwrap();

    let err = manager
        .deprecate_version("wallet-c", KeyType::MasterSeed, 1, "too late")
        .unwrap_err();
    assert!(err.message.contains("compromised") || err.message.contains("Compromised"));
}

#[test]
fn secure_buffer_is_indistinguishable_once_zeroized() {
    let mut buffer = SecureBuffer::from_bytes(b"top secret key material");
    assert!(secure_compare(buffer.as_bytes(), b"top secret key material"));
    buffer.zeroize();
    assert!(!secure_compare(buffer.as_bytes(), b"top secret key material"));
    assert!(buffer.as_bytes().iter().all(|&b| b == 0));
}
