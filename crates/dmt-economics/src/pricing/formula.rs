//! Cost, fee, and yield formulas
//!
//! ```text
//! mint_cost(type, level)   = round(base[type] × 1.5^(level-1))
//! evolution_cost(level,xp) = round(50 × 2.0^(level-1) + xp × 0.1)
//! marketplace_fee(price)   = price × 0.025
//! platform_fee(price)      = price × 0.05
//! staking_reward(a, d)     = a × 0.12 × d / ms_per_year
//! ```
//!
//! All arithmetic is decimal. Rounding to whole DMT is half away from zero.

use super::params::PricingParameters;
use dmt_common::{AgentType, PricingError, ValidationError, MS_PER_YEAR};
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;

/// The four core pricing operations
pub trait PricingModel: Send + Sync {
    /// DMT cost to mint an agent of `agent_type` at `level` (1-based)
    fn mint_cost(&self, agent_type: AgentType, level: u32) -> Result<Decimal, PricingError>;

    /// DMT cost to evolve an agent currently at `level` holding `xp`
    fn evolution_cost(&self, level: u32, xp: u64) -> Result<Decimal, PricingError>;

    /// Transaction fee on a marketplace sale
    fn marketplace_fee(&self, price: Decimal) -> Result<Decimal, PricingError>;

    /// Linear staking yield for `amount` held `duration_ms`
    fn staking_reward(&self, amount: Decimal, duration_ms: i64) -> Result<Decimal, PricingError>;
}

/// Formula-based pricing over fixed parameters
#[derive(Debug, Clone)]
pub struct FormulaPricing {
    params: Arc<PricingParameters>,
}

impl FormulaPricing {
    pub fn new(params: Arc<PricingParameters>) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &PricingParameters {
        &self.params
    }

    /// Platform cut on a marketplace sale; computed independently of
    /// [`PricingModel::marketplace_fee`]
    pub fn platform_fee(&self, price: Decimal) -> Result<Decimal, PricingError> {
        non_negative_price(price)?;
        price
            .checked_mul(self.params.marketplace.platform_fee_rate)
            .ok_or(PricingError::Overflow)
    }

    /// Flat listing fee
    pub fn listing_fee(&self) -> Decimal {
        self.params.marketplace.listing_fee
    }

    /// Reject listings below the minimum price
    pub fn validate_listing_price(&self, price: Decimal) -> Result<(), ValidationError> {
        let minimum = self.params.marketplace.min_listing_price;
        if price < minimum {
            return Err(ValidationError::BelowMinimumListingPrice { price, minimum });
        }
        Ok(())
    }

    /// Mint costs for levels `1..=max_level`
    pub fn mint_schedule(
        &self,
        agent_type: AgentType,
        max_level: u32,
    ) -> Result<Vec<(u32, Decimal)>, PricingError> {
        (1..=max_level)
            .map(|level| self.mint_cost(agent_type, level).map(|cost| (level, cost)))
            .collect()
    }
}

impl Default for FormulaPricing {
    fn default() -> Self {
        Self::new(Arc::new(PricingParameters::default()))
    }
}

impl PricingModel for FormulaPricing {
    fn mint_cost(&self, agent_type: AgentType, level: u32) -> Result<Decimal, PricingError> {
        let exponent = level_exponent(level)?;
        let minting = &self.params.minting;
        let multiplier =
            checked_powu(minting.level_multiplier, exponent).ok_or(PricingError::Overflow)?;
        let cost = minting
            .base_cost(agent_type)
            .checked_mul(multiplier)
            .ok_or(PricingError::Overflow)?;
        Ok(round_whole(cost))
    }

    fn evolution_cost(&self, level: u32, xp: u64) -> Result<Decimal, PricingError> {
        let exponent = level_exponent(level)?;
        let evolution = &self.params.evolution;
        let level_cost = checked_powu(evolution.level_multiplier, exponent)
            .and_then(|m| evolution.base_cost.checked_mul(m))
            .ok_or(PricingError::Overflow)?;
        let xp_cost = Decimal::from(xp)
            .checked_mul(evolution.xp_multiplier)
            .ok_or(PricingError::Overflow)?;
        let total = level_cost
            .checked_add(xp_cost)
            .ok_or(PricingError::Overflow)?;
        Ok(round_whole(total))
    }

    fn marketplace_fee(&self, price: Decimal) -> Result<Decimal, PricingError> {
        non_negative_price(price)?;
        price
            .checked_mul(self.params.marketplace.transaction_fee_rate)
            .ok_or(PricingError::Overflow)
    }

    fn staking_reward(&self, amount: Decimal, duration_ms: i64) -> Result<Decimal, PricingError> {
        if duration_ms < 0 {
            return Err(PricingError::NegativeDuration(duration_ms));
        }
        let numerator = amount
            .checked_mul(self.params.staking.base_apy)
            .and_then(|v| v.checked_mul(Decimal::from(duration_ms)))
            .ok_or(PricingError::Overflow)?;
        numerator
            .checked_div(Decimal::from(MS_PER_YEAR))
            .ok_or(PricingError::Overflow)
    }
}

fn level_exponent(level: u32) -> Result<u32, PricingError> {
    level.checked_sub(1).ok_or(PricingError::InvalidLevel(level))
}

fn non_negative_price(price: Decimal) -> Result<(), PricingError> {
    if price < Decimal::ZERO {
        return Err(PricingError::NegativePrice(price));
    }
    Ok(())
}

#[inline]
fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// `base^exp` by repeated squaring, `None` on overflow
pub(crate) fn checked_powu(base: Decimal, mut exp: u32) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    let mut square = base;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.checked_mul(square)?;
        }
        exp >>= 1;
        if exp > 0 {
            square = square.checked_mul(square)?;
        }
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmt_common::MS_PER_DAY;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn pricing() -> FormulaPricing {
        FormulaPricing::default()
    }

    #[test]
    fn test_mint_cost_examples() {
        let p = pricing();
        assert_eq!(p.mint_cost(AgentType::Sub, 1).unwrap(), dec!(50));
        assert_eq!(p.mint_cost(AgentType::Sub, 2).unwrap(), dec!(75));
        // 50 × 2.25 = 112.5 rounds up
        assert_eq!(p.mint_cost(AgentType::Sub, 3).unwrap(), dec!(113));
        assert_eq!(p.mint_cost(AgentType::Master, 1).unwrap(), dec!(100));
        assert_eq!(p.mint_cost(AgentType::Master, 4).unwrap(), dec!(338));
    }

    #[test]
    fn test_mint_cost_rejects_level_zero() {
        assert_eq!(
            pricing().mint_cost(AgentType::Master, 0),
            Err(PricingError::InvalidLevel(0))
        );
    }

    #[test]
    fn test_mint_cost_overflow() {
        assert_eq!(
            pricing().mint_cost(AgentType::Master, u32::MAX),
            Err(PricingError::Overflow)
        );
    }

    #[test]
    fn test_evolution_cost() {
        let p = pricing();
        assert_eq!(p.evolution_cost(1, 0).unwrap(), dec!(50));
        assert_eq!(p.evolution_cost(3, 0).unwrap(), dec!(200));
        // 100 + 1234 × 0.1 = 223.4
        assert_eq!(p.evolution_cost(2, 1234).unwrap(), dec!(223));
        // 50 + 5 × 0.1 = 50.5
        assert_eq!(p.evolution_cost(1, 5).unwrap(), dec!(51));
    }

    #[test]
    fn test_fees_are_independent() {
        let p = pricing();
        assert_eq!(p.marketplace_fee(dec!(200)).unwrap(), dec!(5.000));
        assert_eq!(p.platform_fee(dec!(200)).unwrap(), dec!(10.00));
        assert_eq!(p.marketplace_fee(Decimal::ZERO).unwrap(), Decimal::ZERO);
        assert!(matches!(
            p.platform_fee(dec!(-1)),
            Err(PricingError::NegativePrice(_))
        ));
    }

    #[test]
    fn test_listing_rules() {
        let p = pricing();
        assert_eq!(p.listing_fee(), dec!(5));
        assert!(p.validate_listing_price(dec!(10)).is_ok());
        assert!(p.validate_listing_price(dec!(9.99)).is_err());
    }

    #[test]
    fn test_staking_reward() {
        let p = pricing();
        assert_eq!(p.staking_reward(dec!(100), 0).unwrap(), Decimal::ZERO);
        assert_eq!(p.staking_reward(dec!(100), MS_PER_YEAR).unwrap(), dec!(12));

        let thirty_days = p.staking_reward(dec!(100), 30 * MS_PER_DAY).unwrap();
        assert!((thirty_days - dec!(0.986)).abs() < dec!(0.001));

        assert_eq!(
            p.staking_reward(dec!(100), -1),
            Err(PricingError::NegativeDuration(-1))
        );
    }

    #[test]
    fn test_mint_schedule() {
        let schedule = pricing().mint_schedule(AgentType::Sub, 3).unwrap();
        assert_eq!(
            schedule,
            vec![(1, dec!(50)), (2, dec!(75)), (3, dec!(113))]
        );
    }

    #[test]
    fn test_checked_powu() {
        assert_eq!(checked_powu(dec!(1.5), 0), Some(Decimal::ONE));
        assert_eq!(checked_powu(dec!(1.5), 3), Some(dec!(3.375)));
        assert_eq!(checked_powu(dec!(2), 10), Some(dec!(1024)));
        assert_eq!(checked_powu(Decimal::ONE, u32::MAX), Some(Decimal::ONE));
        assert_eq!(checked_powu(dec!(10), 40), None);
    }

    proptest! {
        #[test]
        fn prop_mint_cost_monotonic(level in 2u32..60, master in any::<bool>()) {
            let p = pricing();
            let agent_type = if master { AgentType::Master } else { AgentType::Sub };
            let prev = p.mint_cost(agent_type, level - 1).unwrap();
            let cur = p.mint_cost(agent_type, level).unwrap();
            prop_assert!(cur >= prev);
        }

        #[test]
        fn prop_evolution_xp_term_vanishes(level in 1u32..60) {
            let p = pricing();
            let expected = (dec!(50) * checked_powu(dec!(2), level - 1).unwrap())
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
            prop_assert_eq!(p.evolution_cost(level, 0).unwrap(), expected);
        }

        #[test]
        fn prop_fees_are_exact(cents in 0u64..10_000_000_000) {
            let p = pricing();
            let price = Decimal::new(cents as i64, 2);
            prop_assert_eq!(p.marketplace_fee(price).unwrap(), price * dec!(0.025));
            prop_assert_eq!(p.platform_fee(price).unwrap(), price * dec!(0.05));
        }
    }
}
