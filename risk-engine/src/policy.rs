//! Decision policies for login and transaction flows
//!
//! These turn assessments into allow / step-up / block outcomes. Step-up
//! means the user must confirm through an additional verification before
//! the flow continues.

use crate::config::PolicyConfig;
use crate::types::{AnomalyAssessment, RiskAssessment, TransactionType};
use serde::{Deserialize, Serialize};

/// Policy outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Proceed
    Allow,
    /// Require additional verification
    StepUp,
    /// Refuse
    Block,
}

impl Decision {
    /// Label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::StepUp => "step_up",
            Decision::Block => "block",
        }
    }
}

/// Review badge shown next to a stored transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewBadge {
    /// Score below 30, counts as verified
    Safe,
    /// Score below 60
    Monitored,
    /// Everything else
    Flagged,
}

impl ReviewBadge {
    /// Badge for an anomaly score
    pub fn for_score(score: u8) -> Self {
        match score {
            s if s < 30 => ReviewBadge::Safe,
            s if s < 60 => ReviewBadge::Monitored,
            _ => ReviewBadge::Flagged,
        }
    }

    /// Whether the transaction counts as verified
    pub fn is_verified(&self) -> bool {
        matches!(self, ReviewBadge::Safe)
    }
}

/// Login decision policy
#[derive(Debug, Clone, Default)]
pub struct LoginPolicy {
    config: PolicyConfig,
}

impl LoginPolicy {
    /// Create new login policy
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// Decide on a login attempt
    pub fn decide(&self, assessment: &RiskAssessment) -> Decision {
        if let Some(block_at) = self.config.login_block_at {
            if assessment.risk_score >= block_at {
                return Decision::Block;
            }
        }

        if assessment.typing_analysis.paste_detected
            || assessment.risk_score > self.config.login_step_up_above
        {
            return Decision::StepUp;
        }

        Decision::Allow
    }
}

/// Transaction decision policy
#[derive(Debug, Clone, Default)]
pub struct TransactionPolicy {
    config: PolicyConfig,
}

impl TransactionPolicy {
    /// Create new transaction policy
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// Decide on a scored transaction
    pub fn decide(&self, assessment: &AnomalyAssessment) -> Decision {
        let score = assessment.anomaly_score;

        if let Some(block_at) = self.config.transaction_block_at {
            if score >= block_at {
                return Decision::Block;
            }
        }

        let step_up_above = match assessment.transaction_type {
            TransactionType::Withdrawal => self.config.withdrawal_step_up_above,
            TransactionType::Transfer => self.config.transfer_step_up_above,
            // deposits are scored for the record only
            TransactionType::Deposit => return Decision::Allow,
        };

        if assessment.is_anomaly && score > step_up_above {
            Decision::StepUp
        } else {
            Decision::Allow
        }
    }
}
