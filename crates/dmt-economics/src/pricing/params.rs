//! Economic model parameters
//!
//! Fixed at engine construction and never mutated afterwards. Defaults are
//! the production economic model; deployments may override them through
//! [`crate::config::EconomicsConfig`].

use dmt_common::{AgentType, PricingError, MS_PER_DAY};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Agent minting costs (DMT)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MintingParams {
    pub master_base_cost: Decimal,
    pub sub_base_cost: Decimal,
    pub level_multiplier: Decimal,
}

impl Default for MintingParams {
    fn default() -> Self {
        Self {
            master_base_cost: dec!(100),
            sub_base_cost: dec!(50),
            level_multiplier: dec!(1.5),
        }
    }
}

impl MintingParams {
    pub fn base_cost(&self, agent_type: AgentType) -> Decimal {
        match agent_type {
            AgentType::Master => self.master_base_cost,
            AgentType::Sub => self.sub_base_cost,
        }
    }
}

/// Agent evolution costs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionParams {
    pub base_cost: Decimal,
    pub level_multiplier: Decimal,
    pub xp_multiplier: Decimal,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            base_cost: dec!(50),
            level_multiplier: dec!(2.0),
            xp_multiplier: dec!(0.1),
        }
    }
}

/// Marketplace fees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplaceParams {
    /// Flat fee to list an agent (DMT)
    pub listing_fee: Decimal,
    /// Per-sale transaction fee rate (2.5%)
    pub transaction_fee_rate: Decimal,
    /// Platform cut rate (5%)
    pub platform_fee_rate: Decimal,
    /// Lowest accepted listing price (DMT)
    pub min_listing_price: Decimal,
}

impl Default for MarketplaceParams {
    fn default() -> Self {
        Self {
            listing_fee: dec!(5),
            transaction_fee_rate: dec!(0.025),
            platform_fee_rate: dec!(0.05),
            min_listing_price: dec!(10),
        }
    }
}

/// Staking parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StakingParams {
    pub base_apy: Decimal,
    /// Upper bound for `base_apy`; accrual itself never reads it
    pub max_apy: Decimal,
    pub min_stake_amount: Decimal,
    pub lock_period_ms: i64,
    /// Accrual granularity published with the schedule; accrual is continuous
    pub reward_interval_ms: i64,
}

impl Default for StakingParams {
    fn default() -> Self {
        Self {
            base_apy: dec!(0.12),
            max_apy: dec!(0.25),
            min_stake_amount: dec!(100),
            lock_period_ms: 30 * MS_PER_DAY,
            reward_interval_ms: MS_PER_DAY,
        }
    }
}

/// Performance reward amounts (DMT)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardParams {
    pub agent_minting: Decimal,
    pub agent_evolution: Decimal,
    pub quality_review: Decimal,
    pub marketplace_sale: Decimal,
    pub governance_participation: Decimal,
}

impl Default for RewardParams {
    fn default() -> Self {
        Self {
            agent_minting: dec!(10),
            agent_evolution: dec!(25),
            quality_review: dec!(5),
            marketplace_sale: dec!(15),
            governance_participation: dec!(20),
        }
    }
}

/// Penalty magnitudes (DMT, stored positive; ledger entries negate them)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyParams {
    pub spam_review: Decimal,
    pub fraud_attempt: Decimal,
    pub abuse_report: Decimal,
    pub poor_performance: Decimal,
}

impl Default for PenaltyParams {
    fn default() -> Self {
        Self {
            spam_review: dec!(10),
            fraud_attempt: dec!(50),
            abuse_report: dec!(25),
            poor_performance: dec!(15),
        }
    }
}

/// Share of each fee source that is burned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurnParams {
    pub minting: Decimal,
    pub subscription: Decimal,
    pub upgrade: Decimal,
    pub marketplace: Decimal,
    pub dao: Decimal,
}

impl Default for BurnParams {
    fn default() -> Self {
        Self {
            minting: dec!(0.30),
            subscription: dec!(0.20),
            upgrade: dec!(0.15),
            marketplace: dec!(0.20),
            dao: dec!(0.10),
        }
    }
}

/// Complete economic model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingParameters {
    pub minting: MintingParams,
    pub evolution: EvolutionParams,
    pub marketplace: MarketplaceParams,
    pub staking: StakingParams,
    pub rewards: RewardParams,
    pub penalties: PenaltyParams,
    pub burning: BurnParams,
}

impl PricingParameters {
    /// Reject parameter sets the formulas cannot work with
    pub fn validate(&self) -> Result<(), PricingError> {
        positive("minting.master_base_cost", self.minting.master_base_cost)?;
        positive("minting.sub_base_cost", self.minting.sub_base_cost)?;
        at_least_one("minting.level_multiplier", self.minting.level_multiplier)?;
        positive("evolution.base_cost", self.evolution.base_cost)?;
        at_least_one("evolution.level_multiplier", self.evolution.level_multiplier)?;
        non_negative("evolution.xp_multiplier", self.evolution.xp_multiplier)?;

        non_negative("marketplace.listing_fee", self.marketplace.listing_fee)?;
        rate("marketplace.transaction_fee_rate", self.marketplace.transaction_fee_rate)?;
        rate("marketplace.platform_fee_rate", self.marketplace.platform_fee_rate)?;
        non_negative("marketplace.min_listing_price", self.marketplace.min_listing_price)?;

        rate("staking.base_apy", self.staking.base_apy)?;
        rate("staking.max_apy", self.staking.max_apy)?;
        if self.staking.base_apy > self.staking.max_apy {
            return Err(PricingError::InvalidParameter {
                name: "staking.base_apy",
                reason: format!(
                    "{} exceeds max_apy {}",
                    self.staking.base_apy, self.staking.max_apy
                ),
            });
        }
        positive("staking.min_stake_amount", self.staking.min_stake_amount)?;
        if self.staking.lock_period_ms < 0 {
            return Err(PricingError::InvalidParameter {
                name: "staking.lock_period_ms",
                reason: "must not be negative".to_string(),
            });
        }
        if self.staking.reward_interval_ms <= 0 {
            return Err(PricingError::InvalidParameter {
                name: "staking.reward_interval_ms",
                reason: "must be positive".to_string(),
            });
        }

        rate("burning.minting", self.burning.minting)?;
        rate("burning.subscription", self.burning.subscription)?;
        rate("burning.upgrade", self.burning.upgrade)?;
        rate("burning.marketplace", self.burning.marketplace)?;
        rate("burning.dao", self.burning.dao)?;
        Ok(())
    }
}

fn positive(name: &'static str, value: Decimal) -> Result<(), PricingError> {
    if value <= Decimal::ZERO {
        return Err(PricingError::InvalidParameter {
            name,
            reason: format!("{} must be positive", value),
        });
    }
    Ok(())
}

fn non_negative(name: &'static str, value: Decimal) -> Result<(), PricingError> {
    if value < Decimal::ZERO {
        return Err(PricingError::InvalidParameter {
            name,
            reason: format!("{} must not be negative", value),
        });
    }
    Ok(())
}

// Multipliers below one would make costs fall as levels rise
fn at_least_one(name: &'static str, value: Decimal) -> Result<(), PricingError> {
    if value < Decimal::ONE {
        return Err(PricingError::InvalidParameter {
            name,
            reason: format!("{} must be at least 1", value),
        });
    }
    Ok(())
}

fn rate(name: &'static str, value: Decimal) -> Result<(), PricingError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(PricingError::InvalidParameter {
            name,
            reason: format!("{} must be within [0, 1]", value),
        });
    }
    Ok(())
}
