//! Pricing module
//!
//! Deterministic cost, fee, and yield calculations:
//! - Agent minting and evolution costs
//! - Marketplace transaction and platform fees
//! - Linear staking yield

pub mod formula;
pub mod params;

pub use formula::{FormulaPricing, PricingModel};
pub use params::{
    BurnParams, EvolutionParams, MarketplaceParams, MintingParams, PenaltyParams,
    PricingParameters, RewardParams, StakingParams,
};
