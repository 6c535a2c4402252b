//! Credential Cache
//!
//! Holds at most one decrypted `KeySet` per signed-in username so repeat
//! operations (checking a balance, building a second send) don't re-run
//! scrypt. Entries carry the last-seen password or PIN so a caller can
//! re-validate a quick unlock without touching disk, and zeroize on
//! release.

use crate::security::secure_memory::SecureString;
use crate::types::KeySet;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

struct CacheEntry {
    keyset: KeySet,
    last_secret: SecureString,
}

/// Process-wide cache, one entry per signed-in username.
pub struct CredentialCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl CredentialCache {
    fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn insert(&self, username: &str, keyset: KeySet, secret: &str) {
        let mut entries = self.entries.lock().expect("credential cache lock poisoned");
        entries.insert(
            username.to_lowercase(),
            CacheEntry {
                keyset,
                last_secret: SecureString::new(secret),
            },
        );
    }

    /// Returns the cached LP2 data key for `username` if the cache holds
    /// one and `secret` matches what was last used to populate it.
    pub fn verify_and_get_lp2(&self, username: &str, secret: &str) -> Option<Vec<u8>> {
        let entries = self.entries.lock().expect("credential cache lock poisoned");
        let entry = entries.get(&username.to_lowercase())?;
        let matches = entry
            .last_secret
            .as_str()
            .map(|s| crate::security::secure_memory::secure_compare_str(s, secret))
            .unwrap_or(false);
        if matches {
            Some(entry.keyset.lp2.as_bytes().to_vec())
        } else {
            None
        }
    }

    pub fn contains(&self, username: &str) -> bool {
        let entries = self.entries.lock().expect("credential cache lock poisoned");
        entries.contains_key(&username.to_lowercase())
    }

    /// Drop the cached entry for a single account. The `KeySet` and
    /// `SecureString` both zeroize in their own `Drop` impls.
    pub fn release(&self, username: &str) {
        let mut entries = self.entries.lock().expect("credential cache lock poisoned");
        entries.remove(&username.to_lowercase());
    }

    /// Drop every cached entry, e.g. on application shutdown.
    pub fn clear_all(&self) {
        let mut entries = self.entries.lock().expect("credential cache lock poisoned");
        entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("credential cache lock poisoned").len()
    }
}

static CACHE: OnceLock<CredentialCache> = OnceLock::new();

pub fn global() -> &'static CredentialCache {
    CACHE.get_or_init(CredentialCache::new)
}
