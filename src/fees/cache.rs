//! Fee Info Cache
//!
//! Holds the most recently fetched `BitcoinFeeInfo`/`AirbitzFeeInfo` pair
//! for up to 24 hours. Concurrent callers that all observe a stale cache
//! coalesce onto a single refresh instead of hammering the general-info
//! server; whichever thread loses the race to the refresh lock just reads
//! back the result the winner installed.

use crate::types::{AirbitzFeeInfo, BitcoinFeeInfo};
use std::sync::{Mutex, RwLock};
use std::time::{Duration, Instant};

pub const STALE_AFTER: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone)]
pub struct FeeSnapshot {
    pub bitcoin: BitcoinFeeInfo,
    pub airbitz: AirbitzFeeInfo,
    pub fetched_at: Instant,
}

impl FeeSnapshot {
    pub fn is_stale(&self) -> bool {
        self.fetched_at.elapsed() > STALE_AFTER
    }
}

pub struct FeeCache {
    snapshot: RwLock<Option<FeeSnapshot>>,
    refresh_lock: Mutex<()>,
}

impl FeeCache {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Return a cached, non-stale snapshot without making any network call.
    pub fn peek(&self) -> Option<FeeSnapshot> {
        let guard = self.snapshot.read().expect("fee cache lock poisoned");
        guard.clone().filter(|s| !s.is_stale())
    }

    /// Return a usable snapshot, refreshing via `fetch` if the cache is
    /// empty or stale. Concurrent refreshers coalesce on `refresh_lock`:
    /// the second caller to arrive blocks until the first finishes, then
    /// re-checks the cache instead of fetching again.
    pub fn get_or_refresh<F>(&self, fetch: F) -> FeeSnapshot
    where
        F: FnOnce() -> Option<(BitcoinFeeInfo, AirbitzFeeInfo)>,
    {
        if let Some(snapshot) = self.peek() {
            return snapshot;
        }

        let _guard = self.refresh_lock.lock().expect("fee cache refresh lock poisoned");
        // Re-check: another thread may have refreshed while we waited.
        if let Some(snapshot) = self.peek() {
            return snapshot;
        }

        let snapshot = match fetch() {
            Some((bitcoin, airbitz)) => FeeSnapshot {
                bitcoin,
                airbitz,
                fetched_at: Instant::now(),
            },
            None => FeeSnapshot {
                bitcoin: super::bitcoin::fallback_fee_info(),
                airbitz: super::airbitz::fallback_fee_info(),
                fetched_at: Instant::now(),
            },
        };

        *self.snapshot.write().expect("fee cache lock poisoned") = Some(snapshot.clone());
        snapshot
    }
}

impl Default for FeeCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_refresh_happens_once_per_staleness_window() {
        let cache = FeeCache::new();
        let calls = AtomicU32::new(0);

        let fetch = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Some((super::super::bitcoin::fallback_fee_info(), super::super::airbitz::fallback_fee_info()))
        };

        cache.get_or_refresh(fetch);
        cache.get_or_refresh(fetch);
        cache.get_or_refresh(fetch);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_refresh_coalesces() {
        let cache = Arc::new(FeeCache::new());
        let calls = Arc::new(AtomicU32::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                std::thread::spawn(move || {
                    cache.get_or_refresh(|| {
                        calls.fetch_add(1, Ordering::SeqCst);
                        std::thread::sleep(std::time::Duration::from_millis(20));
                        Some((
                            super::super::bitcoin::fallback_fee_info(),
                            super::super::airbitz::fallback_fee_info(),
                        ))
                    });
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
