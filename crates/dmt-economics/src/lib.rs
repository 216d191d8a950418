//! # DMT Economics
//!
//! Pricing, staking, reward issuance, and fee burning for the DMT token.
//!
//! ## Pricing
//!
//! ```text
//! mint_cost(type, level)    = round(base[type] × 1.5^(level-1))
//! evolution_cost(level, xp) = round(50 × 2^(level-1) + 0.1 × xp)
//! staking_reward(a, d)      = a × 12% × d / year
//! ```
//!
//! ## Components
//!
//! - [`pricing`]: deterministic cost, fee, and yield formulas
//! - [`chain`]: token operations behind the [`chain::ChainAdapter`] trait
//! - [`ledger`]: append-only reward/penalty ledger with a retry outbox
//! - [`staking`]: one locked position per account
//! - [`burning`]: source-weighted fee burns and burn analytics
//! - [`engine`]: the [`EconomicsEngine`] facade tying them together

pub mod burning;
pub mod cache;
pub mod chain;
pub mod clock;
pub mod config;
pub mod engine;
pub mod ledger;
pub mod metrics;
pub mod pricing;
pub mod staking;

pub use burning::{BurnRequest, BurnSource, BurningMetrics, BurningStats, FeeBurner};
pub use chain::{ChainAdapter, ChainError, InMemoryChain, TxSignature};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EconomicsConfig;
pub use engine::{
    EconomicMetrics, EconomicsEngine, Issuance, IssuanceStatus, PenaltyKind, PerformanceReward,
    TransactionKind, Unstaked, YieldPayout,
};
pub use ledger::{InMemoryLedger, LedgerStore};
pub use pricing::{FormulaPricing, PricingModel, PricingParameters};
