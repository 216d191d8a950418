//! Chain adapter boundary
//!
//! The engine never builds or signs transactions itself. Every balance read
//! and token movement goes through a [`ChainAdapter`]; the adapter owns RPC,
//! signing, and the wire format.

pub mod memory;

pub use memory::InMemoryChain;

use async_trait::async_trait;
use dmt_common::WalletAddress;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Confirmed transaction signature (base58)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxSignature(pub String);

impl TxSignature {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TxSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Chain-specific failure reported by an adapter
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChainError {
    #[error("RPC unavailable: {0}")]
    Unavailable(String),

    #[error("insufficient funds in {account}: required {required}, available {available}")]
    InsufficientFunds {
        account: String,
        required: Decimal,
        available: Decimal,
    },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("transaction rejected: {0}")]
    Rejected(String),
}

/// Token operations consumed by the engine
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    /// Liquid DMT held by `account`
    async fn get_balance(&self, account: &WalletAddress) -> Result<Decimal, ChainError>;

    /// Move `amount` DMT between accounts
    async fn transfer(
        &self,
        from: &WalletAddress,
        to: &WalletAddress,
        amount: Decimal,
    ) -> Result<TxSignature, ChainError>;

    /// Mint `amount` new DMT into `to`
    async fn mint(&self, to: &WalletAddress, amount: Decimal) -> Result<TxSignature, ChainError>;

    /// Burn `amount` DMT held by `from`
    async fn burn(&self, from: &WalletAddress, amount: Decimal) -> Result<TxSignature, ChainError>;
}
