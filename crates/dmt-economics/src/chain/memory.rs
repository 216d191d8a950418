//! In-memory chain adapter
//!
//! Keeps SPL-style integer balances in base units so precision rules match
//! the real mint. Used by tests, benches, and the demo binary.

use super::{ChainAdapter, ChainError, TxSignature};
use async_trait::async_trait;
use dashmap::DashMap;
use dmt_common::{TokenConfig, WalletAddress};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;

/// DashMap-backed ledger of token accounts
pub struct InMemoryChain {
    token: TokenConfig,
    /// Balances in base units
    accounts: DashMap<WalletAddress, u64>,
    /// Monotonic nonce mixed into signatures
    nonce: AtomicU64,
    /// Total adapter calls, reads included
    calls: AtomicU64,
    minted_units: AtomicU64,
    burned_units: AtomicU64,
    offline: AtomicBool,
}

impl InMemoryChain {
    pub fn new(token: TokenConfig) -> Self {
        Self {
            token,
            accounts: DashMap::new(),
            nonce: AtomicU64::new(0),
            calls: AtomicU64::new(0),
            minted_units: AtomicU64::new(0),
            burned_units: AtomicU64::new(0),
            offline: AtomicBool::new(false),
        }
    }

    /// Set an account balance directly (genesis / test funding)
    pub fn set_balance(&self, account: &WalletAddress, amount: Decimal) -> Result<(), ChainError> {
        let units = self.units(amount)?;
        self.accounts.insert(account.clone(), units);
        Ok(())
    }

    /// Simulate an RPC outage; every call fails while offline
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of adapter calls made so far
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Total DMT minted through this adapter
    pub fn total_minted(&self) -> Decimal {
        self.token
            .from_base_units(self.minted_units.load(Ordering::SeqCst))
    }

    /// Total DMT burned through this adapter
    pub fn total_burned(&self) -> Decimal {
        self.token
            .from_base_units(self.burned_units.load(Ordering::SeqCst))
    }

    fn enter(&self) -> Result<(), ChainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(ChainError::Unavailable("in-memory chain is offline".to_string()));
        }
        Ok(())
    }

    fn units(&self, amount: Decimal) -> Result<u64, ChainError> {
        self.token
            .to_base_units(amount)
            .map_err(|e| ChainError::InvalidAmount(e.to_string()))
    }

    fn positive_units(&self, amount: Decimal) -> Result<u64, ChainError> {
        let units = self.units(amount)?;
        if units == 0 {
            return Err(ChainError::InvalidAmount(format!(
                "{} rounds to zero base units",
                amount
            )));
        }
        Ok(units)
    }

    fn debit(&self, account: &WalletAddress, units: u64) -> Result<(), ChainError> {
        let mut balance = self.accounts.entry(account.clone()).or_insert(0);
        if *balance < units {
            return Err(ChainError::InsufficientFunds {
                account: account.to_string(),
                required: self.token.from_base_units(units),
                available: self.token.from_base_units(*balance),
            });
        }
        *balance -= units;
        Ok(())
    }

    fn credit(&self, account: &WalletAddress, units: u64) -> Result<(), ChainError> {
        let mut balance = self.accounts.entry(account.clone()).or_insert(0);
        *balance = balance
            .checked_add(units)
            .ok_or_else(|| ChainError::Rejected("balance overflow".to_string()))?;
        Ok(())
    }

    /// 64-byte base58 signature derived from the operation and a nonce
    fn sign(&self, op: &str, parts: &[&str], units: u64) -> TxSignature {
        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        let mut hasher = blake3::Hasher::new();
        hasher.update(op.as_bytes());
        for part in parts {
            hasher.update(b":");
            hasher.update(part.as_bytes());
        }
        hasher.update(&units.to_le_bytes());
        hasher.update(&nonce.to_le_bytes());

        let mut sig = [0u8; 64];
        hasher.finalize_xof().fill(&mut sig);
        TxSignature(bs58::encode(sig).into_string())
    }
}

impl Default for InMemoryChain {
    fn default() -> Self {
        Self::new(TokenConfig::default())
    }
}

#[async_trait]
impl ChainAdapter for InMemoryChain {
    async fn get_balance(&self, account: &WalletAddress) -> Result<Decimal, ChainError> {
        self.enter()?;
        let units = self.accounts.get(account).map(|b| *b).unwrap_or(0);
        Ok(self.token.from_base_units(units))
    }

    async fn transfer(
        &self,
        from: &WalletAddress,
        to: &WalletAddress,
        amount: Decimal,
    ) -> Result<TxSignature, ChainError> {
        self.enter()?;
        let units = self.positive_units(amount)?;
        self.debit(from, units)?;
        if let Err(e) = self.credit(to, units) {
            // put the funds back before reporting
            self.credit(from, units)?;
            return Err(e);
        }
        debug!(from = %from, to = %to, units, "transfer applied");
        Ok(self.sign("transfer", &[from.as_str(), to.as_str()], units))
    }

    async fn mint(&self, to: &WalletAddress, amount: Decimal) -> Result<TxSignature, ChainError> {
        self.enter()?;
        let units = self.positive_units(amount)?;
        self.credit(to, units)?;
        self.minted_units.fetch_add(units, Ordering::SeqCst);
        debug!(to = %to, units, "mint applied");
        Ok(self.sign("mint", &[to.as_str()], units))
    }

    async fn burn(&self, from: &WalletAddress, amount: Decimal) -> Result<TxSignature, ChainError> {
        self.enter()?;
        let units = self.positive_units(amount)?;
        self.debit(from, units)?;
        self.burned_units.fetch_add(units, Ordering::SeqCst);
        debug!(from = %from, units, "burn applied");
        Ok(self.sign("burn", &[from.as_str()], units))
    }
}
