//! Preset rewards and penalties
//!
//! Fixed amounts for platform events. Amounts come from
//! [`RewardParams`] / [`PenaltyParams`]; reason codes are stable snake_case
//! strings recorded on the ledger entry.

use crate::pricing::{PenaltyParams, RewardParams};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Events that earn a fixed reward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceReward {
    AgentMinting,
    AgentEvolution,
    QualityReview,
    MarketplaceSale,
    GovernanceParticipation,
}

impl PerformanceReward {
    pub fn amount(self, params: &RewardParams) -> Decimal {
        match self {
            PerformanceReward::AgentMinting => params.agent_minting,
            PerformanceReward::AgentEvolution => params.agent_evolution,
            PerformanceReward::QualityReview => params.quality_review,
            PerformanceReward::MarketplaceSale => params.marketplace_sale,
            PerformanceReward::GovernanceParticipation => params.governance_participation,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            PerformanceReward::AgentMinting => "agent_minting",
            PerformanceReward::AgentEvolution => "agent_evolution",
            PerformanceReward::QualityReview => "quality_review",
            PerformanceReward::MarketplaceSale => "marketplace_sale",
            PerformanceReward::GovernanceParticipation => "governance_participation",
        }
    }
}

/// Misbehaviour that costs a fixed penalty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyKind {
    SpamReview,
    FraudAttempt,
    AbuseReport,
    PoorPerformance,
}

impl PenaltyKind {
    /// Penalty magnitude (always non-negative)
    pub fn amount(self, params: &PenaltyParams) -> Decimal {
        let amount = match self {
            PenaltyKind::SpamReview => params.spam_review,
            PenaltyKind::FraudAttempt => params.fraud_attempt,
            PenaltyKind::AbuseReport => params.abuse_report,
            PenaltyKind::PoorPerformance => params.poor_performance,
        };
        amount.abs()
    }

    pub fn reason(self) -> &'static str {
        match self {
            PenaltyKind::SpamReview => "spam_review",
            PenaltyKind::FraudAttempt => "fraud_attempt",
            PenaltyKind::AbuseReport => "abuse_report",
            PenaltyKind::PoorPerformance => "poor_performance",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reward_amounts() {
        let params = RewardParams::default();
        assert_eq!(PerformanceReward::AgentMinting.amount(&params), dec!(10));
        assert_eq!(PerformanceReward::AgentEvolution.amount(&params), dec!(25));
        assert_eq!(PerformanceReward::QualityReview.amount(&params), dec!(5));
        assert_eq!(PerformanceReward::MarketplaceSale.amount(&params), dec!(15));
        assert_eq!(
            PerformanceReward::GovernanceParticipation.amount(&params),
            dec!(20)
        );
    }

    #[test]
    fn test_penalty_amounts_are_magnitudes() {
        let mut params = PenaltyParams::default();
        assert_eq!(PenaltyKind::SpamReview.amount(&params), dec!(10));
        assert_eq!(PenaltyKind::FraudAttempt.amount(&params), dec!(50));
        assert_eq!(PenaltyKind::AbuseReport.amount(&params), dec!(25));
        assert_eq!(PenaltyKind::PoorPerformance.amount(&params), dec!(15));

        // a signed configuration still yields a magnitude
        params.spam_review = dec!(-10);
        assert_eq!(PenaltyKind::SpamReview.amount(&params), dec!(10));
    }

    #[test]
    fn test_reason_codes_match_serde_names() {
        let json = serde_json::to_string(&PenaltyKind::FraudAttempt).unwrap();
        assert_eq!(json, format!("\"{}\"", PenaltyKind::FraudAttempt.reason()));
        let json = serde_json::to_string(&PerformanceReward::MarketplaceSale).unwrap();
        assert_eq!(json, format!("\"{}\"", PerformanceReward::MarketplaceSale.reason()));
    }
}
