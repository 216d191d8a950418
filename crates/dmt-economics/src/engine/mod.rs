//! Economics engine
//!
//! Facade over pricing, staking, reward/penalty issuance, balances, and fee
//! burning. Built explicitly from its collaborators and shared as
//! `Arc<EconomicsEngine>`.
//!
//! ## Issuance flow
//!
//! ```text
//! validate ──► chain mint/burn ──► build entry ──► ledger append
//!    │               │                                  │
//!    ▼               ▼                                  ▼ (failure)
//!  error        error, nothing                     park in outbox
//!               recorded                           (Deferred)
//! ```
//!
//! The entry id is fixed before the chain call so a parked entry can be
//! replayed through [`EconomicsEngine::flush_outbox`] without duplicates.

pub mod presets;

pub use presets::{PenaltyKind, PerformanceReward};

use crate::burning::FeeBurner;
use crate::cache::{BalanceCache, CacheStats};
use crate::chain::{ChainAdapter, ChainError, TxSignature};
use crate::clock::Clock;
use crate::config::EconomicsConfig;
use crate::ledger::outbox::FlushReport;
use crate::ledger::{LedgerOutbox, LedgerStore, LedgerSummary};
use crate::metrics::EngineMetrics;
use crate::pricing::{FormulaPricing, PricingModel};
use crate::staking::{StakingBook, StakingInfo, StakingStats};
use dmt_common::{
    ChainOperation, EconomicsError, LedgerEntry, Result, StakingError, StakingPosition,
    TokenBalance, ValidationError, WalletAddress,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Whether an issued entry reached the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuanceStatus {
    /// Appended to the ledger
    Committed,
    /// Chain call succeeded, entry parked in the outbox
    Deferred,
}

/// Result of a reward or penalty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issuance {
    pub entry: LedgerEntry,
    pub signature: TxSignature,
    pub status: IssuanceStatus,
}

/// Staking yield paid on unstake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YieldPayout {
    Paid(Issuance),
    /// Yield rounded to zero at token precision
    Nothing,
    /// Principal came back but the yield mint failed
    Failed { amount: Decimal, error: String },
}

/// Result of a successful unstake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unstaked {
    pub position: StakingPosition,
    /// Transfer returning the principal
    pub signature: TxSignature,
    pub payout: YieldPayout,
}

/// Operation checked by [`EconomicsEngine::validate_transaction`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Transfer,
    Stake,
    Unstake,
}

/// Token-wide figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicMetrics {
    pub total_supply: Decimal,
    pub circulating_supply: Decimal,
    pub total_staked: Decimal,
    /// Principal-weighted APY of open positions, base APY when none are open
    pub average_apy: Decimal,
    pub total_rewards_distributed: Decimal,
    pub total_penalties_applied: Decimal,
    /// DMT burned from platform fees
    pub total_burned: Decimal,
    pub active_stakers: usize,
}

/// DMT economics engine
pub struct EconomicsEngine {
    config: EconomicsConfig,
    pricing: FormulaPricing,
    chain: Arc<dyn ChainAdapter>,
    ledger: Arc<dyn LedgerStore>,
    clock: Arc<dyn Clock>,
    cache: Arc<BalanceCache>,
    staking: StakingBook,
    outbox: LedgerOutbox,
    burner: FeeBurner,
    metrics: Arc<EngineMetrics>,
}

impl EconomicsEngine {
    pub fn new(
        config: EconomicsConfig,
        chain: Arc<dyn ChainAdapter>,
        ledger: Arc<dyn LedgerStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let metrics = Arc::new(
            EngineMetrics::new()
                .map_err(|e| EconomicsError::Internal(format!("metrics setup failed: {}", e)))?,
        );
        let cache = Arc::new(BalanceCache::new(
            clock.clone(),
            config.cache_ttl_ms(),
            config.cache_max_entries,
        ));
        let burner = FeeBurner::new(
            chain.clone(),
            clock.clone(),
            cache.clone(),
            metrics.clone(),
            config.pricing.burning.clone(),
            config.token.clone(),
        );
        let pricing = FormulaPricing::new(Arc::new(config.pricing.clone()));

        info!(
            vault = %config.staking_vault,
            cache_ttl_secs = config.cache_ttl_secs,
            "economics engine initialized"
        );

        Ok(Self {
            config,
            pricing,
            chain,
            ledger,
            clock,
            cache,
            staking: StakingBook::new(),
            outbox: LedgerOutbox::new(),
            burner,
            metrics,
        })
    }

    pub fn config(&self) -> &EconomicsConfig {
        &self.config
    }

    pub fn pricing(&self) -> &FormulaPricing {
        &self.pricing
    }

    pub fn burner(&self) -> &FeeBurner {
        &self.burner
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn outbox_len(&self) -> usize {
        self.outbox.len()
    }

    // ---- balances ----

    /// Liquid DMT held by `account`, served from the cache when fresh
    #[instrument(skip_all, fields(account = %account))]
    pub async fn dmt_balance(&self, account: &WalletAddress) -> Result<Decimal> {
        if let Some(balance) = self.cache.get(account) {
            debug!("balance cache hit");
            return Ok(balance);
        }
        self.fresh_balance(account).await
    }

    /// Move DMT between two accounts
    #[instrument(skip_all, fields(from = %from, to = %to, amount = %amount))]
    pub async fn transfer(
        &self,
        from: &WalletAddress,
        to: &WalletAddress,
        amount: Decimal,
    ) -> Result<TxSignature> {
        self.validate_amount(amount)?;
        self.ensure_liquid(from, amount).await?;

        let signature = self
            .chain
            .transfer(from, to, amount)
            .await
            .map_err(|e| self.debit_failure(e))?;
        self.cache.invalidate(from);
        self.cache.invalidate(to);

        info!(signature = %signature, "transfer completed");
        Ok(signature)
    }

    // ---- staking ----

    /// Lock `amount` DMT in the staking vault
    #[instrument(skip_all, fields(account = %account, amount = %amount))]
    pub async fn stake(&self, account: &WalletAddress, amount: Decimal) -> Result<StakingPosition> {
        let params = &self.config.pricing.staking;
        if amount < params.min_stake_amount {
            return Err(ValidationError::BelowMinimumStake {
                amount,
                minimum: params.min_stake_amount,
            }
            .into());
        }
        self.validate_amount(amount)?;

        let _guard = self.staking.begin(account)?;
        if self.staking.has_position(account) {
            return Err(StakingError::AlreadyStaked(account.to_string()).into());
        }
        self.ensure_liquid(account, amount).await?;

        let vault = &self.config.staking_vault;
        let signature = self
            .chain
            .transfer(account, vault, amount)
            .await
            .map_err(|e| self.debit_failure(e))?;
        self.cache.invalidate(account);
        self.cache.invalidate(vault);

        let position = StakingPosition::open(
            account.clone(),
            amount,
            params.base_apy,
            self.clock.now_millis(),
            params.lock_period_ms,
            signature.as_str(),
        );
        self.staking.open(position.clone())?;
        self.metrics.active_stakers.inc();

        info!(lock_end = position.lock_end, signature = %signature, "stake opened");
        Ok(position)
    }

    /// Close an expired position, returning principal and paying the yield
    #[instrument(skip_all, fields(account = %account))]
    pub async fn unstake(&self, account: &WalletAddress) -> Result<Unstaked> {
        let _guard = self.staking.begin(account)?;
        let position = self
            .staking
            .get(account)
            .ok_or_else(|| StakingError::NoPosition(account.to_string()))?;

        let now = self.clock.now_millis();
        if !position.can_unstake(now) {
            return Err(StakingError::Locked {
                lock_end: position.lock_end,
                now,
            }
            .into());
        }

        let accrued = self
            .pricing
            .staking_reward(position.principal, position.elapsed_ms(now))?;
        let accrued = self.config.token.truncate(accrued);

        let vault = &self.config.staking_vault;
        let signature = self
            .chain
            .transfer(vault, account, position.principal)
            .await
            .map_err(|e| self.chain_failure(ChainOperation::Transfer, e))?;
        self.staking.close(account);
        self.metrics.active_stakers.dec();
        self.cache.invalidate(account);
        self.cache.invalidate(vault);

        let payout = if accrued.is_zero() {
            YieldPayout::Nothing
        } else {
            match self.issue_reward(account, accrued, "unstaking_reward").await {
                Ok(issuance) => YieldPayout::Paid(issuance),
                Err(e) => {
                    warn!(error = %e, amount = %accrued, "staking yield not paid");
                    YieldPayout::Failed {
                        amount: accrued,
                        error: e.to_string(),
                    }
                }
            }
        };

        info!(principal = %position.principal, reward = %accrued, "stake closed");
        Ok(Unstaked {
            position,
            signature,
            payout,
        })
    }

    /// Open position with its projected reward
    pub fn staking_info(&self, account: &WalletAddress) -> Option<StakingInfo> {
        self.staking.info(account, self.clock.now_millis())
    }

    pub fn staking_stats(&self) -> StakingStats {
        self.staking.stats()
    }

    // ---- rewards and penalties ----

    /// Mint `amount` to `account` and record a reward entry
    #[instrument(skip_all, fields(account = %account, amount = %amount, reason = %reason))]
    pub async fn add_reward(
        &self,
        account: &WalletAddress,
        amount: Decimal,
        reason: &str,
    ) -> Result<Issuance> {
        self.validate_amount(amount)?;
        self.issue_reward(account, amount, reason).await
    }

    /// Burn `amount` from `account` and record a penalty entry
    #[instrument(skip_all, fields(account = %account, amount = %amount, reason = %reason))]
    pub async fn add_penalty(
        &self,
        account: &WalletAddress,
        amount: Decimal,
        reason: &str,
    ) -> Result<Issuance> {
        self.validate_amount(amount)?;

        let id = Uuid::now_v7();
        let signature = self
            .chain
            .burn(account, amount)
            .await
            .map_err(|e| self.chain_failure(ChainOperation::Burn, e))?;
        self.cache.invalidate(account);
        self.metrics.record_burned(amount);

        let entry = LedgerEntry::penalty(
            id,
            account.clone(),
            amount,
            reason,
            self.clock.now_millis(),
            signature.as_str(),
        )?;
        let status = self.commit(entry.clone()).await;
        self.metrics.penalties_applied.inc();

        info!(entry_id = %id, signature = %signature, ?status, "penalty applied");
        Ok(Issuance {
            entry,
            signature,
            status,
        })
    }

    pub async fn reward(&self, account: &WalletAddress, kind: PerformanceReward) -> Result<Issuance> {
        let amount = kind.amount(&self.config.pricing.rewards);
        self.add_reward(account, amount, kind.reason()).await
    }

    pub async fn penalize(&self, account: &WalletAddress, kind: PenaltyKind) -> Result<Issuance> {
        let amount = kind.amount(&self.config.pricing.penalties);
        self.add_penalty(account, amount, kind.reason()).await
    }

    /// Every entry issued for `account`, parked ones included, oldest first
    #[instrument(skip_all, fields(account = %account))]
    pub async fn reward_history(&self, account: &WalletAddress) -> Result<Vec<LedgerEntry>> {
        let stored = self.ledger.entries_for(account).await?;
        let parked = self
            .outbox
            .pending()
            .into_iter()
            .filter(|e| e.account() == account);
        Ok(merge_entries(stored, parked))
    }

    pub async fn ledger_summary(&self, account: &WalletAddress) -> Result<LedgerSummary> {
        let history = self.reward_history(account).await?;
        Ok(LedgerSummary::from_entries(&history))
    }

    /// Retry every parked ledger entry once
    #[instrument(skip(self))]
    pub async fn flush_outbox(&self) -> FlushReport {
        let report = self.outbox.flush(self.ledger.as_ref()).await;
        self.metrics.outbox_depth.set(report.remaining as i64);
        if report.committed > 0 || report.duplicates > 0 {
            info!(
                committed = report.committed,
                duplicates = report.duplicates,
                remaining = report.remaining,
                "outbox flushed"
            );
        }
        report
    }

    // ---- analytics ----

    /// Liquid, staked, rewarded, and penalized totals for `account`
    #[instrument(skip_all, fields(account = %account))]
    pub async fn token_balance(&self, account: &WalletAddress) -> Result<TokenBalance> {
        let liquid = self.dmt_balance(account).await?;
        let staked = self
            .staking
            .get(account)
            .map(|p| p.principal)
            .unwrap_or(Decimal::ZERO);
        let summary = self.ledger_summary(account).await?;

        Ok(TokenBalance {
            liquid,
            staked,
            rewards: summary.total_rewards,
            penalties: summary.total_penalties,
        })
    }

    /// Whether `account` could currently perform `kind` for `amount`
    #[instrument(skip_all, fields(account = %account, amount = %amount, ?kind))]
    pub async fn validate_transaction(
        &self,
        account: &WalletAddress,
        amount: Decimal,
        kind: TransactionKind,
    ) -> Result<bool> {
        if amount <= Decimal::ZERO {
            return Ok(false);
        }
        match kind {
            TransactionKind::Transfer | TransactionKind::Stake => {
                Ok(self.dmt_balance(account).await? >= amount)
            }
            TransactionKind::Unstake => Ok(self
                .staking
                .get(account)
                .is_some_and(|p| p.principal >= amount)),
        }
    }

    #[instrument(skip(self))]
    pub async fn economic_metrics(&self) -> Result<EconomicMetrics> {
        let token = &self.config.token;
        let stats = self.staking.stats();
        let entries = merge_entries(self.ledger.all_entries().await?, self.outbox.pending());
        let summary = LedgerSummary::from_entries(&entries);

        Ok(EconomicMetrics {
            total_supply: Decimal::from(token.total_supply),
            circulating_supply: token.circulating_supply(),
            total_staked: stats.total_staked,
            average_apy: if stats.active_stakers == 0 {
                self.config.pricing.staking.base_apy
            } else {
                stats.average_apy
            },
            total_rewards_distributed: summary.total_rewards,
            total_penalties_applied: summary.total_penalties,
            total_burned: self.burner.total_burned(),
            active_stakers: stats.active_stakers,
        })
    }

    // ---- internals ----

    async fn issue_reward(
        &self,
        account: &WalletAddress,
        amount: Decimal,
        reason: &str,
    ) -> Result<Issuance> {
        let id = Uuid::now_v7();
        let signature = self
            .chain
            .mint(account, amount)
            .await
            .map_err(|e| self.chain_failure(ChainOperation::Mint, e))?;
        self.cache.invalidate(account);
        self.metrics.record_minted(amount);

        let entry = LedgerEntry::reward(
            id,
            account.clone(),
            amount,
            reason,
            self.clock.now_millis(),
            signature.as_str(),
        )?;
        let status = self.commit(entry.clone()).await;
        self.metrics.rewards_issued.inc();

        info!(entry_id = %id, signature = %signature, ?status, "reward issued");
        Ok(Issuance {
            entry,
            signature,
            status,
        })
    }

    /// Append after a confirmed chain call; park on failure
    async fn commit(&self, entry: LedgerEntry) -> IssuanceStatus {
        match self.ledger.append(entry.clone()).await {
            Ok(_) => IssuanceStatus::Committed,
            Err(e) => {
                warn!(entry_id = %entry.id(), error = %e, "ledger append failed, parking entry");
                self.outbox.park(entry);
                self.metrics.outbox_depth.set(self.outbox.len() as i64);
                IssuanceStatus::Deferred
            }
        }
    }

    async fn fresh_balance(&self, account: &WalletAddress) -> Result<Decimal> {
        let read_at = self.cache.generation();
        let balance = self
            .chain
            .get_balance(account)
            .await
            .map_err(|e| self.chain_failure(ChainOperation::Balance, e))?;
        self.cache.insert(account, balance, read_at);
        Ok(balance)
    }

    /// Fail with `InsufficientBalance` unless `account` holds `amount`
    async fn ensure_liquid(&self, account: &WalletAddress, amount: Decimal) -> Result<()> {
        let available = self.fresh_balance(account).await?;
        if available < amount {
            return Err(ValidationError::InsufficientBalance {
                required: amount,
                available,
            }
            .into());
        }
        Ok(())
    }

    fn validate_amount(&self, amount: Decimal) -> std::result::Result<(), ValidationError> {
        if amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount(amount));
        }
        self.config.token.to_base_units(amount)?;
        Ok(())
    }

    /// Lack of funds reported by the chain surfaces as `InsufficientBalance`
    fn debit_failure(&self, err: ChainError) -> EconomicsError {
        match err {
            ChainError::InsufficientFunds {
                required,
                available,
                ..
            } => {
                debug!(%required, %available, "balance drained before transfer");
                ValidationError::InsufficientBalance {
                    required,
                    available,
                }
                .into()
            }
            other => self.chain_failure(ChainOperation::Transfer, other),
        }
    }

    fn chain_failure(&self, operation: ChainOperation, err: ChainError) -> EconomicsError {
        self.metrics.chain_failures.inc();
        warn!(%operation, error = %err, "chain call failed");
        EconomicsError::chain(operation, err)
    }
}

/// Union of stored and parked entries, deduplicated by id, oldest first
fn merge_entries(
    stored: Vec<LedgerEntry>,
    parked: impl IntoIterator<Item = LedgerEntry>,
) -> Vec<LedgerEntry> {
    let mut seen: HashSet<Uuid> = stored.iter().map(|e| e.id()).collect();
    let mut entries = stored;
    entries.extend(parked.into_iter().filter(|e| seen.insert(e.id())));
    entries.sort_by(|a, b| a.timestamp().cmp(&b.timestamp()).then(a.id().cmp(&b.id())));
    entries
}
