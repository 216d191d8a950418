//! Staking book
//!
//! One active position per account. An in-flight marker per account keeps two
//! concurrent stake/unstake requests from both reaching the chain.

use dashmap::{DashMap, DashSet};
use dmt_common::{StakingError, StakingPosition, WalletAddress};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Active positions keyed by account
#[derive(Default)]
pub struct StakingBook {
    positions: DashMap<WalletAddress, StakingPosition>,
    in_flight: DashSet<WalletAddress>,
}

/// Marks an account busy until dropped
pub struct InFlightGuard<'a> {
    book: &'a StakingBook,
    account: WalletAddress,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.book.in_flight.remove(&self.account);
    }
}

/// Position plus its projections at query time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakingInfo {
    pub position: StakingPosition,
    /// Reward accrued so far (not yet issued)
    pub accrued_reward: Decimal,
    pub can_unstake: bool,
    pub remaining_lock_ms: i64,
}

/// Pool-wide staking figures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StakingStats {
    pub total_staked: Decimal,
    pub active_stakers: usize,
    /// Principal-weighted APY; zero when nothing is staked
    pub average_apy: Decimal,
}

impl StakingBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the account for one stake/unstake operation
    pub fn begin(&self, account: &WalletAddress) -> Result<InFlightGuard<'_>, StakingError> {
        if !self.in_flight.insert(account.clone()) {
            return Err(StakingError::OperationInProgress(account.to_string()));
        }
        Ok(InFlightGuard {
            book: self,
            account: account.clone(),
        })
    }

    pub fn get(&self, account: &WalletAddress) -> Option<StakingPosition> {
        self.positions.get(account).map(|p| p.clone())
    }

    pub fn has_position(&self, account: &WalletAddress) -> bool {
        self.positions.contains_key(account)
    }

    /// Record a new position (`NONE → STAKED`)
    pub fn open(&self, position: StakingPosition) -> Result<(), StakingError> {
        match self.positions.entry(position.account.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(StakingError::AlreadyStaked(position.account.to_string()))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(position);
                Ok(())
            }
        }
    }

    /// Remove a position (`STAKED → NONE`)
    pub fn close(&self, account: &WalletAddress) -> Option<StakingPosition> {
        self.positions.remove(account).map(|(_, p)| p)
    }

    /// Position with projections at `now`
    pub fn info(&self, account: &WalletAddress, now: i64) -> Option<StakingInfo> {
        self.get(account).map(|position| StakingInfo {
            accrued_reward: position.accrued_reward(now),
            can_unstake: position.can_unstake(now),
            remaining_lock_ms: position.remaining_lock_ms(now),
            position,
        })
    }

    pub fn stats(&self) -> StakingStats {
        let (total, weighted, count) = self.positions.iter().fold(
            (Decimal::ZERO, Decimal::ZERO, 0usize),
            |(total, weighted, count), p| {
                (
                    total + p.principal,
                    weighted + p.principal * p.apy,
                    count + 1,
                )
            },
        );

        StakingStats {
            total_staked: total,
            active_stakers: count,
            average_apy: if total.is_zero() {
                Decimal::ZERO
            } else {
                weighted / total
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmt_common::MS_PER_DAY;
    use rust_decimal_macros::dec;

    fn addr(n: u8) -> WalletAddress {
        WalletAddress::from_bytes([n; 32])
    }

    fn position(n: u8, principal: Decimal, apy: Decimal) -> StakingPosition {
        StakingPosition::open(addr(n), principal, apy, 0, 30 * MS_PER_DAY, "sig")
    }

    #[test]
    fn test_one_position_per_account() {
        let book = StakingBook::new();
        book.open(position(1, dec!(100), dec!(0.12))).unwrap();
        let err = book.open(position(1, dec!(500), dec!(0.12))).unwrap_err();
        assert!(matches!(err, StakingError::AlreadyStaked(_)));
        assert_eq!(book.get(&addr(1)).unwrap().principal, dec!(100));

        assert!(book.close(&addr(1)).is_some());
        assert!(!book.has_position(&addr(1)));
        assert!(book.close(&addr(1)).is_none());
    }

    #[test]
    fn test_in_flight_guard() {
        let book = StakingBook::new();
        let guard = book.begin(&addr(1)).unwrap();
        assert!(matches!(
            book.begin(&addr(1)),
            Err(StakingError::OperationInProgress(_))
        ));
        // other accounts are unaffected
        let _other = book.begin(&addr(2)).unwrap();
        drop(guard);
        assert!(book.begin(&addr(1)).is_ok());
    }

    #[test]
    fn test_info_projection() {
        let book = StakingBook::new();
        book.open(position(1, dec!(100), dec!(0.12))).unwrap();

        let info = book.info(&addr(1), 15 * MS_PER_DAY).unwrap();
        assert!(!info.can_unstake);
        assert_eq!(info.remaining_lock_ms, 15 * MS_PER_DAY);
        assert!(info.accrued_reward > Decimal::ZERO);

        let info = book.info(&addr(1), 30 * MS_PER_DAY).unwrap();
        assert!(info.can_unstake);
        assert!(book.info(&addr(9), 0).is_none());
    }

    #[test]
    fn test_stats() {
        let book = StakingBook::new();
        assert_eq!(book.stats(), StakingStats::default());

        book.open(position(1, dec!(100), dec!(0.12))).unwrap();
        book.open(position(2, dec!(300), dec!(0.20))).unwrap();
        let stats = book.stats();
        assert_eq!(stats.total_staked, dec!(400));
        assert_eq!(stats.active_stakers, 2);
        // (12 + 60) / 400
        assert_eq!(stats.average_apy, dec!(0.18));
    }
}
