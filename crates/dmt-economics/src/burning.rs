//! Fee burning
//!
//! A fixed share of each platform fee is burned on-chain. The share depends
//! on where the fee came from:
//!
//! | Source       | Burned |
//! |--------------|--------|
//! | minting      | 30%    |
//! | subscription | 20%    |
//! | upgrade      | 15%    |
//! | marketplace  | 20%    |
//! | dao          | 10%    |
//!
//! Every successful burn is kept as a [`BurnEvent`]; [`BurningMetrics`] and
//! [`BurningStats`] are computed from those events on demand.

use crate::cache::BalanceCache;
use crate::chain::{ChainAdapter, TxSignature};
use crate::clock::Clock;
use crate::metrics::EngineMetrics;
use crate::pricing::BurnParams;
use dmt_common::{
    ChainOperation, EconomicsError, Result, TokenConfig, ValidationError, WalletAddress,
    MS_PER_DAY,
};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Where a burned fee originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BurnSource {
    Minting,
    Subscription,
    Upgrade,
    Marketplace,
    Dao,
}

impl BurnSource {
    pub const ALL: [BurnSource; 5] = [
        BurnSource::Minting,
        BurnSource::Subscription,
        BurnSource::Upgrade,
        BurnSource::Marketplace,
        BurnSource::Dao,
    ];

    /// Share of the fee burned for this source
    pub fn rate(self, params: &BurnParams) -> Decimal {
        match self {
            BurnSource::Minting => params.minting,
            BurnSource::Subscription => params.subscription,
            BurnSource::Upgrade => params.upgrade,
            BurnSource::Marketplace => params.marketplace,
            BurnSource::Dao => params.dao,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BurnSource::Minting => "minting",
            BurnSource::Subscription => "subscription",
            BurnSource::Upgrade => "upgrade",
            BurnSource::Marketplace => "marketplace",
            BurnSource::Dao => "dao",
        }
    }
}

impl std::fmt::Display for BurnSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fee to burn a share of
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnRequest {
    /// Account paying the fee
    pub account: WalletAddress,
    /// Full fee amount; the burned share is derived from `source`
    pub amount: Decimal,
    pub source: BurnSource,
    pub agent_id: Option<String>,
    /// Subscription tier, proposal id, or similar
    pub reference: Option<String>,
}

impl BurnRequest {
    pub fn new(account: WalletAddress, amount: Decimal, source: BurnSource) -> Self {
        Self {
            account,
            amount,
            source,
            agent_id: None,
            reference: None,
        }
    }

    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// A completed burn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnEvent {
    pub id: Uuid,
    pub account: WalletAddress,
    pub source: BurnSource,
    /// Fee the burn was taken from
    pub fee: Decimal,
    /// DMT actually burned
    pub amount: Decimal,
    pub agent_id: Option<String>,
    pub reference: Option<String>,
    pub signature: TxSignature,
    pub timestamp: i64,
}

/// Outcome of [`FeeBurner::burn_fee`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnResult {
    pub burned: Decimal,
    /// `None` when the burned share rounded to zero
    pub event: Option<BurnEvent>,
}

/// Aggregate burn figures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BurningMetrics {
    pub total_burned: Decimal,
    pub by_source: BTreeMap<BurnSource, Decimal>,
    pub last_burn_at: Option<i64>,
    /// Total burned as a percentage of total supply
    pub burn_rate_pct: Decimal,
    pub burned_last_24h: Decimal,
    pub burned_last_30d: Decimal,
}

/// Week-over-week burn direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BurnTrend {
    Increasing,
    Decreasing,
    #[default]
    Stable,
}

impl BurnTrend {
    /// Compare the last 7 days against the 7 days before
    pub fn classify(recent: Decimal, previous: Decimal) -> Self {
        if recent > previous * dec!(1.1) {
            BurnTrend::Increasing
        } else if recent < previous * dec!(0.9) {
            BurnTrend::Decreasing
        } else {
            BurnTrend::Stable
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BurningStats {
    pub total_events: usize,
    pub total_burned: Decimal,
    pub average_per_event: Decimal,
    pub most_active_source: Option<BurnSource>,
    pub trend: BurnTrend,
}

/// Burns the configured share of platform fees
pub struct FeeBurner {
    chain: Arc<dyn ChainAdapter>,
    clock: Arc<dyn Clock>,
    cache: Arc<BalanceCache>,
    metrics: Arc<EngineMetrics>,
    rates: BurnParams,
    token: TokenConfig,
    events: RwLock<Vec<BurnEvent>>,
}

impl FeeBurner {
    pub fn new(
        chain: Arc<dyn ChainAdapter>,
        clock: Arc<dyn Clock>,
        cache: Arc<BalanceCache>,
        metrics: Arc<EngineMetrics>,
        rates: BurnParams,
        token: TokenConfig,
    ) -> Self {
        Self {
            chain,
            clock,
            cache,
            metrics,
            rates,
            token,
            events: RwLock::new(Vec::new()),
        }
    }

    /// Burn `rate(source) × amount` from the paying account
    #[instrument(skip_all, fields(account = %request.account, source = %request.source, amount = %request.amount))]
    pub async fn burn_fee(&self, request: BurnRequest) -> Result<BurnResult> {
        if request.amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount(request.amount).into());
        }

        let burned = self
            .token
            .truncate(request.amount * request.source.rate(&self.rates));
        if burned.is_zero() {
            debug!("burn share rounds to zero, nothing burned");
            return Ok(BurnResult {
                burned,
                event: None,
            });
        }

        let signature = self
            .chain
            .burn(&request.account, burned)
            .await
            .map_err(|e| {
                self.metrics.chain_failures.inc();
                EconomicsError::chain(ChainOperation::Burn, e)
            })?;
        self.cache.invalidate(&request.account);
        self.metrics.record_burned(burned);

        let event = BurnEvent {
            id: Uuid::now_v7(),
            account: request.account,
            source: request.source,
            fee: request.amount,
            amount: burned,
            agent_id: request.agent_id,
            reference: request.reference,
            signature,
            timestamp: self.clock.now_millis(),
        };
        self.events.write().push(event.clone());

        info!(burned = %burned, signature = %event.signature, "fee burned");
        Ok(BurnResult {
            burned,
            event: Some(event),
        })
    }

    pub async fn burn_minting_fee(
        &self,
        account: WalletAddress,
        fee: Decimal,
        agent_id: Option<String>,
    ) -> Result<BurnResult> {
        let mut request = BurnRequest::new(account, fee, BurnSource::Minting);
        request.agent_id = agent_id;
        self.burn_fee(request).await
    }

    pub async fn burn_subscription_fee(
        &self,
        account: WalletAddress,
        fee: Decimal,
        tier: Option<String>,
    ) -> Result<BurnResult> {
        let mut request = BurnRequest::new(account, fee, BurnSource::Subscription);
        request.reference = tier;
        self.burn_fee(request).await
    }

    pub async fn burn_upgrade_fee(
        &self,
        account: WalletAddress,
        fee: Decimal,
        agent_id: Option<String>,
    ) -> Result<BurnResult> {
        let mut request = BurnRequest::new(account, fee, BurnSource::Upgrade);
        request.agent_id = agent_id;
        self.burn_fee(request).await
    }

    pub async fn burn_marketplace_fee(
        &self,
        account: WalletAddress,
        fee: Decimal,
        agent_id: Option<String>,
    ) -> Result<BurnResult> {
        let mut request = BurnRequest::new(account, fee, BurnSource::Marketplace);
        request.agent_id = agent_id;
        self.burn_fee(request).await
    }

    /// Burn from the DAO treasury account
    pub async fn burn_dao_treasury(
        &self,
        treasury: WalletAddress,
        amount: Decimal,
        proposal_id: Option<String>,
    ) -> Result<BurnResult> {
        let mut request = BurnRequest::new(treasury, amount, BurnSource::Dao);
        request.reference = proposal_id;
        self.burn_fee(request).await
    }

    /// All burn events, newest first
    pub fn events(&self) -> Vec<BurnEvent> {
        let mut events = self.events.read().clone();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        events
    }

    pub fn events_for(&self, account: &WalletAddress) -> Vec<BurnEvent> {
        self.events()
            .into_iter()
            .filter(|e| &e.account == account)
            .collect()
    }

    pub fn events_by_source(&self, source: BurnSource) -> Vec<BurnEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.source == source)
            .collect()
    }

    pub fn total_burned(&self) -> Decimal {
        self.events.read().iter().map(|e| e.amount).sum()
    }

    pub fn total_burned_by_source(&self, source: BurnSource) -> Decimal {
        self.events
            .read()
            .iter()
            .filter(|e| e.source == source)
            .map(|e| e.amount)
            .sum()
    }

    pub fn metrics(&self) -> BurningMetrics {
        let now = self.clock.now_millis();
        let events = self.events.read();

        let mut by_source: BTreeMap<BurnSource, Decimal> =
            BurnSource::ALL.iter().map(|s| (*s, Decimal::ZERO)).collect();
        let mut total = Decimal::ZERO;
        for event in events.iter() {
            total += event.amount;
            *by_source.entry(event.source).or_default() += event.amount;
        }

        let supply = Decimal::from(self.token.total_supply);
        let burn_rate_pct = if supply.is_zero() {
            Decimal::ZERO
        } else {
            total / supply * dec!(100)
        };

        BurningMetrics {
            total_burned: total,
            by_source,
            last_burn_at: events.iter().map(|e| e.timestamp).max(),
            burn_rate_pct,
            burned_last_24h: sum_between(&events, now - MS_PER_DAY, now),
            burned_last_30d: sum_between(&events, now - 30 * MS_PER_DAY, now),
        }
    }

    pub fn stats(&self) -> BurningStats {
        let now = self.clock.now_millis();
        let events = self.events.read();

        let total_events = events.len();
        let total_burned: Decimal = events.iter().map(|e| e.amount).sum();
        let average_per_event = if total_events == 0 {
            Decimal::ZERO
        } else {
            total_burned / Decimal::from(total_events)
        };

        let mut counts: BTreeMap<BurnSource, usize> = BTreeMap::new();
        for event in events.iter() {
            *counts.entry(event.source).or_default() += 1;
        }
        let most_active_source = counts
            .into_iter()
            .max_by_key(|(_, count)| *count)
            .map(|(source, _)| source);

        let week = 7 * MS_PER_DAY;
        let recent = sum_between(&events, now - week, now);
        let previous = sum_between(&events, now - 2 * week, now - week);

        BurningStats {
            total_events,
            total_burned,
            average_per_event,
            most_active_source,
            trend: BurnTrend::classify(recent, previous),
        }
    }
}

/// Sum of burns with `after < timestamp <= until`
fn sum_between(events: &[BurnEvent], after: i64, until: i64) -> Decimal {
    events
        .iter()
        .filter(|e| e.timestamp > after && e.timestamp <= until)
        .map(|e| e.amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::InMemoryChain;
    use crate::clock::ManualClock;

    const START: i64 = 100 * MS_PER_DAY;

    struct Fixture {
        chain: Arc<InMemoryChain>,
        clock: Arc<ManualClock>,
        burner: FeeBurner,
    }

    fn fixture() -> Fixture {
        let chain = Arc::new(InMemoryChain::default());
        let clock = Arc::new(ManualClock::new(START));
        let cache = Arc::new(BalanceCache::new(clock.clone(), 1_000, 16));
        let metrics = Arc::new(EngineMetrics::new().unwrap());
        let burner = FeeBurner::new(
            chain.clone(),
            clock.clone(),
            cache,
            metrics,
            BurnParams::default(),
            TokenConfig::default(),
        );
        Fixture {
            chain,
            clock,
            burner,
        }
    }

    fn addr(n: u8) -> WalletAddress {
        WalletAddress::from_bytes([n; 32])
    }

    #[tokio::test]
    async fn test_burns_source_share() {
        let f = fixture();
        f.chain.set_balance(&addr(1), dec!(1000)).unwrap();

        let result = f
            .burner
            .burn_minting_fee(addr(1), dec!(100), Some("agent-1".to_string()))
            .await
            .unwrap();
        assert_eq!(result.burned, dec!(30));
        let event = result.event.unwrap();
        assert_eq!(event.fee, dec!(100));
        assert_eq!(event.agent_id.as_deref(), Some("agent-1"));

        assert_eq!(f.chain.get_balance(&addr(1)).await.unwrap(), dec!(970));
        assert_eq!(f.chain.total_burned(), dec!(30));
    }

    #[tokio::test]
    async fn test_rejects_non_positive_fee() {
        let f = fixture();
        let err = f
            .burner
            .burn_fee(BurnRequest::new(addr(1), Decimal::ZERO, BurnSource::Dao))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(f.chain.call_count(), 0);
    }

    #[tokio::test]
    async fn test_chain_failure_records_nothing() {
        let f = fixture();
        f.chain.set_balance(&addr(1), dec!(1)).unwrap();
        let err = f
            .burner
            .burn_upgrade_fee(addr(1), dec!(100), None)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("DMT burning failed"));
        assert!(f.burner.events().is_empty());
    }

    #[tokio::test]
    async fn test_metrics_windows() {
        let f = fixture();
        f.chain.set_balance(&addr(1), dec!(10000)).unwrap();

        f.burner
            .burn_marketplace_fee(addr(1), dec!(100), None)
            .await
            .unwrap();
        f.clock.advance(2 * MS_PER_DAY);
        f.burner
            .burn_subscription_fee(addr(1), dec!(50), Some("pro".to_string()))
            .await
            .unwrap();

        let metrics = f.burner.metrics();
        assert_eq!(metrics.total_burned, dec!(30));
        assert_eq!(metrics.by_source[&BurnSource::Marketplace], dec!(20));
        assert_eq!(metrics.by_source[&BurnSource::Subscription], dec!(10));
        assert_eq!(metrics.by_source[&BurnSource::Dao], Decimal::ZERO);
        assert_eq!(metrics.burned_last_24h, dec!(10));
        assert_eq!(metrics.burned_last_30d, dec!(30));
        assert_eq!(metrics.last_burn_at, Some(START + 2 * MS_PER_DAY));
        assert_eq!(metrics.burn_rate_pct, dec!(0.000003));
    }

    #[tokio::test]
    async fn test_stats_trend() {
        let f = fixture();
        f.chain.set_balance(&addr(1), dec!(10000)).unwrap();

        f.burner
            .burn_minting_fee(addr(1), dec!(100), None)
            .await
            .unwrap();
        f.clock.advance(8 * MS_PER_DAY);
        f.burner
            .burn_minting_fee(addr(1), dec!(200), None)
            .await
            .unwrap();
        f.burner
            .burn_dao_treasury(addr(1), dec!(10), Some("prop-7".to_string()))
            .await
            .unwrap();

        let stats = f.burner.stats();
        assert_eq!(stats.total_events, 3);
        assert_eq!(stats.total_burned, dec!(91));
        assert_eq!(stats.most_active_source, Some(BurnSource::Minting));
        assert_eq!(stats.trend, BurnTrend::Increasing);
    }

    #[test]
    fn test_trend_thresholds() {
        assert_eq!(BurnTrend::classify(dec!(111), dec!(100)), BurnTrend::Increasing);
        assert_eq!(BurnTrend::classify(dec!(110), dec!(100)), BurnTrend::Stable);
        assert_eq!(BurnTrend::classify(dec!(89), dec!(100)), BurnTrend::Decreasing);
        assert_eq!(BurnTrend::classify(Decimal::ZERO, Decimal::ZERO), BurnTrend::Stable);
    }
}
