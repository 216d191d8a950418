//! Error types for the DMT economics engine
//!
//! Three families, in the order an operation can hit them:
//! - validation errors, raised before any chain call
//! - chain failures, wrapped with a fixed `DMT <operation> failed` prefix
//! - ledger/store failures

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type alias using EconomicsError
pub type Result<T> = std::result::Result<T, EconomicsError>;

/// Unified error type for economics operations
#[derive(Debug, Error)]
pub enum EconomicsError {
    // Input validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // Pricing errors
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    // Staking errors
    #[error("Staking error: {0}")]
    Staking(#[from] StakingError),

    // Ledger errors
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    // Chain adapter failures, wrapped into a generic message
    #[error("DMT {operation} failed: {message}")]
    Chain {
        operation: ChainOperation,
        message: String,
    },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EconomicsError {
    /// Wrap a chain-specific failure
    pub fn chain(operation: ChainOperation, err: impl std::fmt::Display) -> Self {
        EconomicsError::Chain {
            operation,
            message: err.to_string(),
        }
    }

    /// True for errors raised before any chain call was attempted
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EconomicsError::Validation(_) | EconomicsError::Pricing(_) | EconomicsError::Staking(_)
        )
    }
}

/// Chain operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOperation {
    Balance,
    Transfer,
    Mint,
    Burn,
}

impl std::fmt::Display for ChainOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainOperation::Balance => write!(f, "balance lookup"),
            ChainOperation::Transfer => write!(f, "transfer"),
            ChainOperation::Mint => write!(f, "minting"),
            ChainOperation::Burn => write!(f, "burning"),
        }
    }
}

/// Input validation errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("Minimum stake amount is {minimum} DMT, got {amount}")]
    BelowMinimumStake { amount: Decimal, minimum: Decimal },

    #[error("Insufficient DMT balance: required {required}, available {available}")]
    InsufficientBalance {
        required: Decimal,
        available: Decimal,
    },

    #[error("Invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("Amount {amount} exceeds token precision of {decimals} decimals")]
    PrecisionExceeded { amount: Decimal, decimals: u32 },

    #[error("Listing price {price} is below the minimum of {minimum}")]
    BelowMinimumListingPrice { price: Decimal, minimum: Decimal },
}

/// Pricing calculation errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PricingError {
    #[error("Agent level must be at least 1, got {0}")]
    InvalidLevel(u32),

    #[error("Price must not be negative, got {0}")]
    NegativePrice(Decimal),

    #[error("Duration must not be negative, got {0}ms")]
    NegativeDuration(i64),

    #[error("Invalid pricing parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Pricing calculation overflow")]
    Overflow,
}

/// Staking lifecycle errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StakingError {
    #[error("No staking found for wallet {0}")]
    NoPosition(String),

    #[error("Wallet {0} already has an active staking position")]
    AlreadyStaked(String),

    #[error("Staking is still locked until {lock_end} (now {now})")]
    Locked { lock_end: i64, now: i64 },

    #[error("Another staking operation is in progress for wallet {0}")]
    OperationInProgress(String),
}

/// Ledger store errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Ledger storage unavailable: {0}")]
    Unavailable(String),

    #[error("Penalty magnitude must not be negative, got {0}")]
    NegativeMagnitude(Decimal),
}

// Implement From for common external error types
impl From<serde_json::Error> for EconomicsError {
    fn from(err: serde_json::Error) -> Self {
        EconomicsError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for EconomicsError {
    fn from(err: anyhow::Error) -> Self {
        EconomicsError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_chain_error_prefix() {
        let err = EconomicsError::chain(ChainOperation::Mint, "rpc timeout");
        assert_eq!(err.to_string(), "DMT minting failed: rpc timeout");
    }

    #[test]
    fn test_validation_classification() {
        let err: EconomicsError = ValidationError::BelowMinimumStake {
            amount: dec!(50),
            minimum: dec!(100),
        }
        .into();
        assert!(err.is_validation());
        assert!(err.to_string().contains("Minimum stake amount is 100"));

        let err = EconomicsError::chain(ChainOperation::Burn, "x");
        assert!(!err.is_validation());
    }
}
