//! Engine configuration
//!
//! Defaults first, then an optional file, then `DMT__`-prefixed environment
//! variables (`DMT__CACHE_TTL_SECS=10`, `DMT__PRICING__STAKING__BASE_APY=0.1`).

use crate::pricing::PricingParameters;
use dmt_common::{EconomicsError, Result, TokenConfig, WalletAddress};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Largest SPL decimals value with exact `u64` base units
const MAX_DECIMALS: u32 = 18;

/// Economics engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomicsConfig {
    /// Solana RPC endpoint used by a networked chain adapter
    pub rpc_url: String,
    /// Account that holds staked principal
    pub staking_vault: WalletAddress,
    /// Balance cache TTL; 0 disables caching
    pub cache_ttl_secs: u64,
    /// Upper bound on cached balances
    pub cache_max_entries: usize,
    pub token: TokenConfig,
    pub pricing: PricingParameters,
}

impl Default for EconomicsConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.devnet.solana.com".to_string(),
            staking_vault: default_staking_vault(),
            cache_ttl_secs: 30,
            cache_max_entries: 10_000,
            token: TokenConfig::default(),
            pricing: PricingParameters::default(),
        }
    }
}

impl EconomicsConfig {
    /// Load from `.env`, an optional config file, and the environment
    pub fn load(path: Option<&str>) -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        builder = builder.add_source(config::Environment::with_prefix("DMT").separator("__"));

        let cfg: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| EconomicsError::Config(e.to_string()))?;

        cfg.validate()?;
        debug!(rpc_url = %cfg.rpc_url, vault = %cfg.staking_vault, "configuration loaded");
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.token.decimals > MAX_DECIMALS {
            return Err(EconomicsError::Config(format!(
                "token decimals must be at most {}, got {}",
                MAX_DECIMALS, self.token.decimals
            )));
        }
        if self.token.total_supply == 0 {
            return Err(EconomicsError::Config(
                "token total supply must be positive".to_string(),
            ));
        }
        if self.cache_max_entries == 0 {
            return Err(EconomicsError::Config(
                "cache_max_entries must be positive".to_string(),
            ));
        }
        self.pricing.validate()?;
        Ok(())
    }

    pub fn cache_ttl_ms(&self) -> i64 {
        i64::try_from(self.cache_ttl_secs.saturating_mul(1000)).unwrap_or(i64::MAX)
    }
}

/// Deterministic vault address used when none is configured
fn default_staking_vault() -> WalletAddress {
    let digest = blake3::hash(b"dmt:staking-vault");
    WalletAddress::from_bytes(*digest.as_bytes())
}
