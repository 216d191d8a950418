//! Staking positions
//!
//! A position is opened by a stake and closed by an unstake once the lock has
//! expired. Reward accrual is a read-only projection over elapsed time.

use crate::types::address::WalletAddress;
use crate::MS_PER_YEAR;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Active staking position for one account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakingPosition {
    /// Owner
    pub account: WalletAddress,

    /// Staked principal in DMT
    pub principal: Decimal,

    /// APY applied to the principal (0.12 = 12%)
    pub apy: Decimal,

    /// Stake time (Unix milliseconds)
    pub staked_at: i64,

    /// Lock expiry (Unix milliseconds)
    pub lock_end: i64,

    /// Signature of the transfer into the staking vault
    pub tx_reference: String,
}

impl StakingPosition {
    /// Open a position at `staked_at` locked for `lock_period_ms`
    pub fn open(
        account: WalletAddress,
        principal: Decimal,
        apy: Decimal,
        staked_at: i64,
        lock_period_ms: i64,
        tx_reference: impl Into<String>,
    ) -> Self {
        Self {
            account,
            principal,
            apy,
            staked_at,
            lock_end: staked_at.saturating_add(lock_period_ms),
            tx_reference: tx_reference.into(),
        }
    }

    /// True once the lock has expired
    #[inline]
    pub fn can_unstake(&self, now: i64) -> bool {
        now >= self.lock_end
    }

    /// Milliseconds elapsed since the stake, clamped at zero
    pub fn elapsed_ms(&self, now: i64) -> i64 {
        (now - self.staked_at).max(0)
    }

    /// Linear (non-compounding) reward accrued up to `now`
    pub fn accrued_reward(&self, now: i64) -> Decimal {
        self.principal * self.apy * Decimal::from(self.elapsed_ms(now))
            / Decimal::from(MS_PER_YEAR)
    }

    /// Milliseconds remaining until unlock
    pub fn remaining_lock_ms(&self, now: i64) -> i64 {
        (self.lock_end - now).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MS_PER_DAY;
    use rust_decimal_macros::dec;

    fn position() -> StakingPosition {
        StakingPosition::open(
            WalletAddress::from_bytes([1u8; 32]),
            dec!(100),
            dec!(0.12),
            1_000,
            30 * MS_PER_DAY,
            "sig",
        )
    }

    #[test]
    fn test_lock_window() {
        let pos = position();
        assert_eq!(pos.lock_end, 1_000 + 30 * MS_PER_DAY);
        assert!(!pos.can_unstake(pos.lock_end - 1));
        assert!(pos.can_unstake(pos.lock_end));
        assert_eq!(pos.remaining_lock_ms(pos.lock_end + 5), 0);
    }

    #[test]
    fn test_accrual_projection() {
        let pos = position();
        assert_eq!(pos.accrued_reward(pos.staked_at), Decimal::ZERO);
        // before stake time clamps to zero
        assert_eq!(pos.accrued_reward(0), Decimal::ZERO);

        let one_year = pos.staked_at + MS_PER_YEAR;
        assert_eq!(pos.accrued_reward(one_year), dec!(12));
    }
}
