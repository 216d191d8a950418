//! DMT token configuration and base-unit conversion
//!
//! On-chain amounts are integers in base units (`10^decimals` per DMT).
//! The engine works in whole-token decimals and converts at the chain edge.

use crate::error::ValidationError;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Default SPL decimals for DMT
pub const DEFAULT_DECIMALS: u32 = 9;

/// Default total supply (1 billion DMT)
pub const DEFAULT_TOTAL_SUPPLY: u64 = 1_000_000_000;

/// Share of total supply treated as circulating
pub const CIRCULATING_SHARE: Decimal = dec!(0.7);

/// Initial allocation of the total supply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenAllocation {
    pub team: Decimal,
    pub treasury: Decimal,
    pub community: Decimal,
    pub staking: Decimal,
    pub ecosystem: Decimal,
}

impl Default for TokenAllocation {
    fn default() -> Self {
        Self {
            team: dec!(0.10),
            treasury: dec!(0.20),
            community: dec!(0.30),
            staking: dec!(0.25),
            ecosystem: dec!(0.15),
        }
    }
}

impl TokenAllocation {
    /// Sum of all shares; a well-formed allocation sums to exactly 1
    pub fn total(&self) -> Decimal {
        self.team + self.treasury + self.community + self.staking + self.ecosystem
    }
}

/// DMT mint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Mint address (base58)
    pub mint: String,
    /// SPL decimals
    pub decimals: u32,
    /// Total supply in whole DMT
    pub total_supply: u64,
    /// Initial allocation
    pub allocation: TokenAllocation,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            mint: "11111111111111111111111111111111".to_string(),
            decimals: DEFAULT_DECIMALS,
            total_supply: DEFAULT_TOTAL_SUPPLY,
            allocation: TokenAllocation::default(),
        }
    }
}

impl TokenConfig {
    fn scale(&self) -> Decimal {
        Decimal::from(10u64.pow(self.decimals))
    }

    /// Convert whole DMT into base units, rejecting sub-unit precision
    pub fn to_base_units(&self, amount: Decimal) -> Result<u64, ValidationError> {
        if amount < Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount(amount));
        }

        let scaled = amount
            .checked_mul(self.scale())
            .ok_or(ValidationError::PrecisionExceeded {
                amount,
                decimals: self.decimals,
            })?;

        if scaled.fract() != Decimal::ZERO {
            return Err(ValidationError::PrecisionExceeded {
                amount,
                decimals: self.decimals,
            });
        }

        u64::try_from(scaled).map_err(|_| ValidationError::PrecisionExceeded {
            amount,
            decimals: self.decimals,
        })
    }

    /// Convert base units back into whole DMT
    pub fn from_base_units(&self, units: u64) -> Decimal {
        Decimal::from(units) / self.scale()
    }

    /// Truncate an amount to what the mint can represent
    pub fn truncate(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.decimals, RoundingStrategy::ToZero)
    }

    /// Circulating supply (70% of total)
    pub fn circulating_supply(&self) -> Decimal {
        Decimal::from(self.total_supply) * CIRCULATING_SHARE
    }
}
