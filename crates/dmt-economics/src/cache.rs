//! Balance cache
//!
//! Short-lived cache of liquid chain balances. Entries expire after a fixed
//! TTL and every mutating engine operation invalidates the accounts it
//! touched, so a read never outlives a write made through the engine.
//!
//! A chain read that started before an invalidation of the same account is
//! not cached: callers take [`BalanceCache::generation`] before reading and
//! hand it back to [`BalanceCache::insert`].

use crate::clock::Clock;
use dashmap::DashMap;
use dmt_common::WalletAddress;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
struct CachedBalance {
    balance: Decimal,
    expires_at: i64,
}

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// TTL cache of liquid balances keyed by account
pub struct BalanceCache {
    entries: DashMap<WalletAddress, CachedBalance>,
    /// Generation of the latest invalidation per account
    invalidated: DashMap<WalletAddress, u64>,
    generation: AtomicU64,
    clock: Arc<dyn Clock>,
    ttl_ms: i64,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl BalanceCache {
    pub fn new(clock: Arc<dyn Clock>, ttl_ms: i64, max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            invalidated: DashMap::new(),
            generation: AtomicU64::new(0),
            clock,
            ttl_ms,
            max_entries: max_entries.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Fresh cached balance, if any
    pub fn get(&self, account: &WalletAddress) -> Option<Decimal> {
        let now = self.clock.now_millis();
        let hit = self
            .entries
            .get(account)
            .filter(|e| now < e.expires_at)
            .map(|e| e.balance);

        match hit {
            Some(balance) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(balance)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Generation to pass to [`insert`](Self::insert) for a read starting now
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Cache `balance` unless `account` was invalidated after `read_at`
    ///
    /// Returns whether the balance was stored.
    pub fn insert(&self, account: &WalletAddress, balance: Decimal, read_at: u64) -> bool {
        if self.ttl_ms <= 0 {
            return false;
        }

        // held until the entry is written so invalidate cannot interleave
        let marker = self.invalidated.get(account);
        if marker.as_deref().is_some_and(|g| *g > read_at) {
            debug!(account = %account, "dropping balance read older than last write");
            return false;
        }
        let now = self.clock.now_millis();

        if self.entries.len() >= self.max_entries && !self.entries.contains_key(account) {
            self.entries.retain(|_, v| now < v.expires_at);

            // still full: drop the entry closest to expiry
            if self.entries.len() >= self.max_entries {
                let victim = self
                    .entries
                    .iter()
                    .min_by_key(|e| e.expires_at)
                    .map(|e| e.key().clone());
                if let Some(key) = victim {
                    debug!(account = %key, "evicting cached balance");
                    self.entries.remove(&key);
                }
            }
        }

        self.entries.insert(
            account.clone(),
            CachedBalance {
                balance,
                expires_at: now.saturating_add(self.ttl_ms),
            },
        );
        drop(marker);
        true
    }

    pub fn invalidate(&self, account: &WalletAddress) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let mut marker = self.invalidated.entry(account.clone()).or_insert(0);
        *marker = generation;
        self.entries.remove(account);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use rust_decimal_macros::dec;

    fn addr(n: u8) -> WalletAddress {
        WalletAddress::from_bytes([n; 32])
    }

    fn cache(ttl_ms: i64, max_entries: usize) -> (Arc<ManualClock>, BalanceCache) {
        let clock = Arc::new(ManualClock::new(0));
        let cache = BalanceCache::new(clock.clone(), ttl_ms, max_entries);
        (clock, cache)
    }

    #[test]
    fn test_hit_miss_and_expiry() {
        let (clock, cache) = cache(1_000, 10);
        assert!(cache.get(&addr(1)).is_none());

        cache.insert(&addr(1), dec!(42), cache.generation());
        assert_eq!(cache.get(&addr(1)), Some(dec!(42)));

        clock.advance(1_000);
        assert!(cache.get(&addr(1)).is_none());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
    }

    #[test]
    fn test_invalidate() {
        let (_, cache) = cache(1_000, 10);
        cache.insert(&addr(1), dec!(1), cache.generation());
        cache.invalidate(&addr(1));
        assert!(cache.get(&addr(1)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_eviction_prefers_expired() {
        let (clock, cache) = cache(1_000, 2);
        cache.insert(&addr(1), dec!(1), cache.generation());
        clock.advance(600);
        cache.insert(&addr(2), dec!(2), cache.generation());
        clock.advance(600);

        // addr(1) is expired and goes first
        cache.insert(&addr(3), dec!(3), cache.generation());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&addr(2)), Some(dec!(2)));
        assert_eq!(cache.get(&addr(3)), Some(dec!(3)));

        // nothing expired: the entry closest to expiry is dropped
        cache.insert(&addr(4), dec!(4), cache.generation());
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&addr(2)).is_none());
        assert_eq!(cache.get(&addr(4)), Some(dec!(4)));
    }

    #[test]
    fn test_zero_ttl_disables_caching() {
        let (_, cache) = cache(0, 10);
        assert!(!cache.insert(&addr(1), dec!(1), cache.generation()));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_read_older_than_invalidation_is_dropped() {
        let (_, cache) = cache(1_000, 10);
        let read_at = cache.generation();
        cache.invalidate(&addr(1));

        assert!(!cache.insert(&addr(1), dec!(100), read_at));
        assert!(cache.get(&addr(1)).is_none());

        // other accounts are unaffected
        assert!(cache.insert(&addr(2), dec!(7), read_at));
        assert!(cache.insert(&addr(1), dec!(125), cache.generation()));
        assert_eq!(cache.get(&addr(1)), Some(dec!(125)));
    }
}
