//! DMT economics binary
//!
//! Loads configuration, prints the pricing schedule it resolves to, then runs
//! a short simulation against the in-memory chain and dumps the resulting
//! metrics.
//!
//! Usage: `dmt-economics [config-file] [max-level]`

use anyhow::Result;
use dmt_common::{format_dmt, AgentType, WalletAddress, DMT_SYMBOL, VERSION};
use dmt_economics::{
    EconomicsConfig, EconomicsEngine, FormulaPricing, InMemoryChain, InMemoryLedger,
    PerformanceReward, PricingModel, SystemClock,
};
use prometheus::{Encoder, Registry, TextEncoder};
use rust_decimal_macros::dec;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const MS_PER_HOUR: i64 = 60 * 60 * 1000;
const DEFAULT_MAX_LEVEL: u32 = 10;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting DMT economics v{}", VERSION);

    let mut args = std::env::args().skip(1);
    let path = args.next();
    let max_level = match args.next() {
        Some(raw) => raw.parse::<u32>()?,
        None => DEFAULT_MAX_LEVEL,
    };

    let config = EconomicsConfig::load(path.as_deref())?;
    info!(
        "Token: {} decimals, supply {}",
        config.token.decimals,
        format_dmt(config.token.total_supply.into())
    );

    let pricing = FormulaPricing::new(Arc::new(config.pricing.clone()));

    println!("{:>5}  {:>14}  {:>14}  {:>14}", "level", "master", "sub", "evolution");
    for level in 1..=max_level {
        println!(
            "{:>5}  {:>14}  {:>14}  {:>14}",
            level,
            format_dmt(pricing.mint_cost(AgentType::Master, level)?),
            format_dmt(pricing.mint_cost(AgentType::Sub, level)?),
            format_dmt(pricing.evolution_cost(level, 0)?),
        );
    }

    let sample_price = dec!(100);
    println!();
    println!(
        "listing fee {}, sale of {}: transaction fee {}, platform fee {}",
        format_dmt(pricing.listing_fee()),
        format_dmt(sample_price),
        format_dmt(pricing.marketplace_fee(sample_price)?),
        format_dmt(pricing.platform_fee(sample_price)?),
    );

    let staking = &config.pricing.staking;
    let lock_reward = pricing.staking_reward(staking.min_stake_amount, staking.lock_period_ms)?;
    let interval_reward =
        pricing.staking_reward(staking.min_stake_amount, staking.reward_interval_ms)?;
    println!(
        "minimum stake {} earns {} over the lock period ({}% APY), {} per {}h",
        format_dmt(staking.min_stake_amount),
        format_dmt(lock_reward),
        (staking.base_apy * dec!(100)).normalize(),
        format_dmt(interval_reward),
        staking.reward_interval_ms / MS_PER_HOUR,
    );
    info!("{} schedule printed", DMT_SYMBOL);

    simulate(config).await
}

/// Stake, earn, and burn on the in-memory chain
async fn simulate(config: EconomicsConfig) -> Result<()> {
    let chain = Arc::new(InMemoryChain::new(config.token.clone()));
    let engine = EconomicsEngine::new(
        config,
        chain.clone(),
        Arc::new(InMemoryLedger::new()),
        Arc::new(SystemClock),
    )?;
    let registry = Registry::new();
    engine.metrics().register(&registry)?;

    let wallet = WalletAddress::from_bytes([7u8; 32]);
    chain.set_balance(&wallet, dec!(1000))?;

    let min_stake = engine.config().pricing.staking.min_stake_amount;
    engine.stake(&wallet, min_stake).await?;
    engine.reward(&wallet, PerformanceReward::AgentMinting).await?;
    let mint_cost = engine.pricing().mint_cost(AgentType::Sub, 1)?;
    engine
        .burner()
        .burn_minting_fee(wallet.clone(), mint_cost, None)
        .await?;

    println!();
    println!("simulated wallet {}: {}", wallet, engine.token_balance(&wallet).await?);
    println!(
        "{}",
        serde_json::to_string_pretty(&engine.economic_metrics().await?)?
    );

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    println!("{}", String::from_utf8(buffer)?);

    Ok(())
}
