//! Reward ledger entries
//!
//! Every balance-affecting reward or penalty is recorded as one immutable
//! entry. The sign of `amount` encodes direction: rewards are positive, and a
//! penalty always stores the negation of its magnitude.

use crate::error::LedgerError;
use crate::types::address::WalletAddress;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Reward,
    Penalty,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::Reward => write!(f, "reward"),
            EntryKind::Penalty => write!(f, "penalty"),
        }
    }
}

/// Immutable reward/penalty record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    id: Uuid,
    account: WalletAddress,
    kind: EntryKind,
    amount: Decimal,
    reason: String,
    timestamp: i64,
    tx_reference: String,
}

impl LedgerEntry {
    /// Build a reward entry; `amount` is stored as-is
    pub fn reward(
        id: Uuid,
        account: WalletAddress,
        amount: Decimal,
        reason: impl Into<String>,
        timestamp: i64,
        tx_reference: impl Into<String>,
    ) -> Result<Self, LedgerError> {
        if amount < Decimal::ZERO {
            return Err(LedgerError::NegativeMagnitude(amount));
        }
        Ok(Self {
            id,
            account,
            kind: EntryKind::Reward,
            amount,
            reason: reason.into(),
            timestamp,
            tx_reference: tx_reference.into(),
        })
    }

    /// Build a penalty entry from its magnitude; the stored amount is `-magnitude`
    pub fn penalty(
        id: Uuid,
        account: WalletAddress,
        magnitude: Decimal,
        reason: impl Into<String>,
        timestamp: i64,
        tx_reference: impl Into<String>,
    ) -> Result<Self, LedgerError> {
        if magnitude < Decimal::ZERO {
            return Err(LedgerError::NegativeMagnitude(magnitude));
        }
        Ok(Self {
            id,
            account,
            kind: EntryKind::Penalty,
            amount: -magnitude,
            reason: reason.into(),
            timestamp,
            tx_reference: tx_reference.into(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn account(&self) -> &WalletAddress {
        &self.account
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Signed amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Unsigned amount
    pub fn magnitude(&self) -> Decimal {
        self.amount.abs()
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Unix milliseconds
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Chain signature of the mint/burn/transfer this entry records
    pub fn tx_reference(&self) -> &str {
        &self.tx_reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn wallet() -> WalletAddress {
        WalletAddress::from_bytes([3u8; 32])
    }

    #[test]
    fn test_penalty_is_negated() {
        let entry =
            LedgerEntry::penalty(Uuid::now_v7(), wallet(), dec!(10), "spam", 0, "sig").unwrap();
        assert_eq!(entry.kind(), EntryKind::Penalty);
        assert_eq!(entry.amount(), dec!(-10));
        assert_eq!(entry.magnitude(), dec!(10));
    }

    #[test]
    fn test_negative_magnitudes_rejected() {
        let id = Uuid::now_v7();
        assert!(LedgerEntry::penalty(id, wallet(), dec!(-1), "x", 0, "sig").is_err());
        assert!(LedgerEntry::reward(id, wallet(), dec!(-1), "x", 0, "sig").is_err());
    }

    #[test]
    fn test_serde_kind() {
        let entry =
            LedgerEntry::reward(Uuid::now_v7(), wallet(), dec!(5), "quality_review", 1, "sig")
                .unwrap();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["kind"], "reward");
        let back: LedgerEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}
