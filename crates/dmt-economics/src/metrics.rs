//! Prometheus metrics for the engine

use prometheus::{Counter, IntCounter, IntGauge, Registry};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Engine counters and gauges
pub struct EngineMetrics {
    pub rewards_issued: IntCounter,
    pub penalties_applied: IntCounter,
    pub chain_failures: IntCounter,
    pub outbox_depth: IntGauge,
    pub active_stakers: IntGauge,
    pub tokens_minted: Counter,
    pub tokens_burned: Counter,
}

impl EngineMetrics {
    pub fn new() -> prometheus::Result<Self> {
        Ok(Self {
            rewards_issued: IntCounter::new(
                "dmt_rewards_issued_total",
                "Reward entries issued",
            )?,
            penalties_applied: IntCounter::new(
                "dmt_penalties_applied_total",
                "Penalty entries applied",
            )?,
            chain_failures: IntCounter::new(
                "dmt_chain_failures_total",
                "Chain adapter calls that failed",
            )?,
            outbox_depth: IntGauge::new(
                "dmt_outbox_depth",
                "Ledger entries waiting in the outbox",
            )?,
            active_stakers: IntGauge::new("dmt_active_stakers", "Open staking positions")?,
            tokens_minted: Counter::new("dmt_tokens_minted_total", "DMT minted as rewards")?,
            tokens_burned: Counter::new(
                "dmt_tokens_burned_total",
                "DMT burned by penalties and fees",
            )?,
        })
    }

    pub fn register(&self, registry: &Registry) -> prometheus::Result<()> {
        registry.register(Box::new(self.rewards_issued.clone()))?;
        registry.register(Box::new(self.penalties_applied.clone()))?;
        registry.register(Box::new(self.chain_failures.clone()))?;
        registry.register(Box::new(self.outbox_depth.clone()))?;
        registry.register(Box::new(self.active_stakers.clone()))?;
        registry.register(Box::new(self.tokens_minted.clone()))?;
        registry.register(Box::new(self.tokens_burned.clone()))?;
        Ok(())
    }

    pub(crate) fn record_minted(&self, amount: Decimal) {
        self.tokens_minted.inc_by(amount.to_f64().unwrap_or(0.0));
    }

    pub(crate) fn record_burned(&self, amount: Decimal) {
        self.tokens_burned.inc_by(amount.to_f64().unwrap_or(0.0));
    }
}
