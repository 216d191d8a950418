//! Ledger outbox
//!
//! Holds entries whose chain operation already succeeded but whose ledger
//! append failed. Flushing re-appends them; the store's id-idempotent append
//! makes a retry after a partial success harmless.

use super::store::{AppendOutcome, LedgerStore};
use dmt_common::LedgerEntry;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::{debug, warn};
use uuid::Uuid;

/// Outcome of a flush pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Entries newly written to the ledger
    pub committed: usize,
    /// Entries the ledger already held
    pub duplicates: usize,
    /// Entries still parked after this pass
    pub remaining: usize,
}

/// FIFO of ledger entries awaiting a successful append
#[derive(Default)]
pub struct LedgerOutbox {
    pending: Mutex<VecDeque<LedgerEntry>>,
}

impl LedgerOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park an entry for a later retry
    pub fn park(&self, entry: LedgerEntry) {
        debug!(entry_id = %entry.id(), account = %entry.account(), "parking ledger entry");
        self.pending.lock().push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Snapshot of parked entries
    pub fn pending(&self) -> Vec<LedgerEntry> {
        self.pending.lock().iter().cloned().collect()
    }

    /// Retry every parked entry once, in order
    ///
    /// An entry leaves the outbox only after the store accepted it, so it
    /// stays visible through [`pending`](Self::pending) while its append is in
    /// flight. The first failure stops the pass; that entry and everything
    /// behind it stay parked in their original order.
    pub async fn flush(&self, store: &dyn LedgerStore) -> FlushReport {
        let batch = self.pending();
        let mut report = FlushReport::default();

        for entry in batch {
            match store.append(entry.clone()).await {
                Ok(AppendOutcome::Appended) => report.committed += 1,
                Ok(AppendOutcome::Duplicate) => report.duplicates += 1,
                Err(e) => {
                    warn!(entry_id = %entry.id(), error = %e, "outbox flush stopped");
                    break;
                }
            }
            self.remove(entry.id());
        }

        report.remaining = self.len();
        report
    }

    fn remove(&self, id: Uuid) {
        let mut pending = self.pending.lock();
        if let Some(pos) = pending.iter().position(|e| e.id() == id) {
            pending.remove(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::store::InMemoryLedger;
    use async_trait::async_trait;
    use dmt_common::{LedgerError, WalletAddress};
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::Notify;

    /// Ledger that can be switched into a failing state
    #[derive(Default)]
    struct FlakyLedger {
        inner: InMemoryLedger,
        down: AtomicBool,
    }

    #[async_trait]
    impl LedgerStore for FlakyLedger {
        async fn append(&self, entry: LedgerEntry) -> Result<AppendOutcome, LedgerError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(LedgerError::Unavailable("down".to_string()));
            }
            self.inner.append(entry).await
        }

        async fn entries_for(
            &self,
            account: &WalletAddress,
        ) -> Result<Vec<LedgerEntry>, LedgerError> {
            self.inner.entries_for(account).await
        }

        async fn all_entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
            self.inner.all_entries().await
        }

        async fn count(&self) -> Result<usize, LedgerError> {
            self.inner.count().await
        }
    }

    /// Ledger whose appends wait for a release
    #[derive(Default)]
    struct GatedLedger {
        inner: InMemoryLedger,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl LedgerStore for GatedLedger {
        async fn append(&self, entry: LedgerEntry) -> Result<AppendOutcome, LedgerError> {
            self.entered.notify_one();
            self.release.notified().await;
            self.inner.append(entry).await
        }

        async fn entries_for(
            &self,
            account: &WalletAddress,
        ) -> Result<Vec<LedgerEntry>, LedgerError> {
            self.inner.entries_for(account).await
        }

        async fn all_entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
            self.inner.all_entries().await
        }

        async fn count(&self) -> Result<usize, LedgerError> {
            self.inner.count().await
        }
    }

    fn entry(n: i64) -> LedgerEntry {
        LedgerEntry::reward(
            Uuid::now_v7(),
            WalletAddress::from_bytes([1u8; 32]),
            dec!(1),
            "test",
            n,
            "sig",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_flush_commits_and_skips_duplicates() {
        let store = InMemoryLedger::new();
        let outbox = LedgerOutbox::new();
        let already = entry(1);
        store.append(already.clone()).await.unwrap();

        outbox.park(already);
        outbox.park(entry(2));

        let report = outbox.flush(&store).await;
        assert_eq!(
            report,
            FlushReport {
                committed: 1,
                duplicates: 1,
                remaining: 0
            }
        );
        assert!(outbox.is_empty());
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_failed_flush_keeps_order() {
        let store = FlakyLedger::default();
        store.down.store(true, Ordering::SeqCst);
        let outbox = LedgerOutbox::new();
        let (a, b) = (entry(1), entry(2));
        outbox.park(a.clone());
        outbox.park(b.clone());

        let report = outbox.flush(&store).await;
        assert_eq!(report.committed, 0);
        assert_eq!(report.remaining, 2);
        let pending = outbox.pending();
        assert_eq!(pending[0].id(), a.id());
        assert_eq!(pending[1].id(), b.id());

        store.down.store(false, Ordering::SeqCst);
        let report = outbox.flush(&store).await;
        assert_eq!(report.committed, 2);
        assert_eq!(report.remaining, 0);
    }

    #[tokio::test]
    async fn test_entry_stays_visible_while_append_in_flight() {
        let store = Arc::new(GatedLedger::default());
        let outbox = Arc::new(LedgerOutbox::new());
        let parked = entry(1);
        outbox.park(parked.clone());

        let flush = tokio::spawn({
            let (outbox, store) = (outbox.clone(), store.clone());
            async move { outbox.flush(&*store).await }
        });
        store.entered.notified().await;

        let pending = outbox.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id(), parked.id());
        assert_eq!(store.count().await.unwrap(), 0);

        // parked during the flush: stays behind for the next pass
        let later = entry(2);
        outbox.park(later.clone());

        store.release.notify_one();
        let report = flush.await.unwrap();
        assert_eq!(report.committed, 1);
        assert_eq!(report.remaining, 1);
        assert_eq!(outbox.pending()[0].id(), later.id());
    }
}
