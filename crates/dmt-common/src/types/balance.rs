//! TokenBalance - per-query view of an account's DMT position
//!
//! Not a durable entity: rebuilt on every query from the chain balance, the
//! staking book, and the reward ledger.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenBalance {
    /// Spendable DMT held in the wallet
    pub liquid: Decimal,

    /// DMT locked in an active staking position
    pub staked: Decimal,

    /// Sum of recorded rewards
    pub rewards: Decimal,

    /// Sum of recorded penalty magnitudes (non-negative)
    pub penalties: Decimal,
}

impl TokenBalance {
    /// Liquid plus staked
    #[inline]
    pub fn total(&self) -> Decimal {
        self.liquid + self.staked
    }

    /// Net ledger effect (rewards minus penalties)
    #[inline]
    pub fn net_ledger(&self) -> Decimal {
        self.rewards - self.penalties
    }
}

impl std::fmt::Display for TokenBalance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TokenBalance(liquid={}, staked={}, rewards={}, penalties={})",
            self.liquid, self.staked, self.rewards, self.penalties
        )
    }
}
