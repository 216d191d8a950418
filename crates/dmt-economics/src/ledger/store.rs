//! Ledger storage backends

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use dmt_common::{EntryKind, LedgerEntry, LedgerError, WalletAddress};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of an append
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Entry was recorded
    Appended,
    /// An entry with the same id already exists; nothing changed
    Duplicate,
}

/// Append-only ledger storage
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Append an entry; idempotent on `entry.id()`
    async fn append(&self, entry: LedgerEntry) -> Result<AppendOutcome, LedgerError>;

    /// Entries for one account, in append order
    async fn entries_for(&self, account: &WalletAddress) -> Result<Vec<LedgerEntry>, LedgerError>;

    /// Every entry across all accounts
    async fn all_entries(&self) -> Result<Vec<LedgerEntry>, LedgerError>;

    /// Total number of entries
    async fn count(&self) -> Result<usize, LedgerError>;
}

/// In-memory ledger
///
/// Uses DashMap for concurrent per-account append lists.
#[derive(Default)]
pub struct InMemoryLedger {
    by_account: DashMap<WalletAddress, Vec<LedgerEntry>>,
    ids: DashSet<Uuid>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn append(&self, entry: LedgerEntry) -> Result<AppendOutcome, LedgerError> {
        if !self.ids.insert(entry.id()) {
            return Ok(AppendOutcome::Duplicate);
        }
        self.by_account
            .entry(entry.account().clone())
            .or_default()
            .push(entry);
        Ok(AppendOutcome::Appended)
    }

    async fn entries_for(&self, account: &WalletAddress) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self
            .by_account
            .get(account)
            .map(|entries| entries.clone())
            .unwrap_or_default())
    }

    async fn all_entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        let mut entries: Vec<LedgerEntry> = self
            .by_account
            .iter()
            .flat_map(|e| e.value().clone())
            .collect();
        entries.sort_by_key(|e| (e.timestamp(), e.id()));
        Ok(entries)
    }

    async fn count(&self) -> Result<usize, LedgerError> {
        Ok(self.ids.len())
    }
}

/// Aggregate of a set of ledger entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    /// Sum of reward amounts
    pub total_rewards: Decimal,
    /// Sum of penalty magnitudes (non-negative)
    pub total_penalties: Decimal,
    pub reward_count: usize,
    pub penalty_count: usize,
}

impl LedgerSummary {
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a LedgerEntry>) -> Self {
        entries
            .into_iter()
            .fold(Self::default(), |mut acc, entry| {
                match entry.kind() {
                    EntryKind::Reward => {
                        acc.total_rewards += entry.amount();
                        acc.reward_count += 1;
                    }
                    EntryKind::Penalty => {
                        acc.total_penalties += entry.magnitude();
                        acc.penalty_count += 1;
                    }
                }
                acc
            })
    }

    /// Signed sum of all entries
    pub fn net(&self) -> Decimal {
        self.total_rewards - self.total_penalties
    }
}
