//! # DMT Common
//!
//! Shared types and errors for the DMT economics engine.
//!
//! ## Core Types
//!
//! - [`WalletAddress`]: base58 Solana-style account address (32 bytes)
//! - [`TokenConfig`]: DMT mint parameters, supply, and base-unit conversion
//! - [`TokenBalance`]: liquid/staked/reward/penalty view of an account
//! - [`StakingPosition`]: a single locked stake with its reward projection
//! - [`LedgerEntry`]: append-only reward or penalty record
//!
//! ## Errors
//!
//! - [`EconomicsError`]: unified error type, see [`error`]

pub mod error;
pub mod format;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{
    ChainOperation, EconomicsError, LedgerError, PricingError, Result, StakingError,
    ValidationError,
};
pub use format::{format_dmt, format_sol};
pub use types::{
    address::WalletAddress,
    agent::AgentType,
    balance::TokenBalance,
    ledger_entry::{EntryKind, LedgerEntry},
    staking::StakingPosition,
    token::{TokenAllocation, TokenConfig},
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Token ticker
pub const DMT_SYMBOL: &str = "DMT";

/// Milliseconds in one day
pub const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Milliseconds in a (non-leap) year, used for APY interpolation
pub const MS_PER_YEAR: i64 = 365 * MS_PER_DAY;

/// Lamports per SOL
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;
