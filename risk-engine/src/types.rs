//! Core types for the behavior risk engine

use crate::config::CombinerConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Milliseconds since an arbitrary epoch (the UI clock)
pub type Millis = i64;

/// Raw telemetry event pushed by the signal collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
    /// Key pressed
    KeyDown {
        /// Key identifier
        key: String,
        /// Event time
        t: Millis,
    },

    /// Key released
    KeyUp {
        /// Key identifier
        key: String,
        /// Event time
        t: Millis,
    },

    /// Clipboard paste into an input
    Paste {
        /// Event time
        t: Millis,
    },

    /// Pointer moved (touch-move is reported as a pointer move)
    PointerMove {
        /// Horizontal position, px
        x: f64,
        /// Vertical position, px
        y: f64,
        /// Event time
        t: Millis,
    },

    /// Pointer clicked
    PointerClick {
        /// Horizontal position, px
        x: f64,
        /// Vertical position, px
        y: f64,
        /// Event time
        t: Millis,
    },

    /// Touch started
    Touch {
        /// Horizontal position, px
        x: f64,
        /// Vertical position, px
        y: f64,
        /// Event time
        t: Millis,
    },
}

impl InputEvent {
    /// Event timestamp
    pub fn timestamp(&self) -> Millis {
        match self {
            InputEvent::KeyDown { t, .. }
            | InputEvent::KeyUp { t, .. }
            | InputEvent::Paste { t }
            | InputEvent::PointerMove { t, .. }
            | InputEvent::PointerClick { t, .. }
            | InputEvent::Touch { t, .. } => *t,
        }
    }
}

/// Confidence attached to an analyzer verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Not enough evidence
    Low,
    /// Evidence points away from normal behavior
    Medium,
    /// Strong evidence
    High,
}

/// Behavioral risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    /// Low risk
    Low,
    /// Medium risk
    Medium,
    /// High risk
    High,
}

impl RiskLevel {
    /// Classify a risk score; both bounds are exclusive-upper
    pub fn from_score(score: f64, config: &CombinerConfig) -> Self {
        if score < config.low_below {
            RiskLevel::Low
        } else if score < config.medium_below {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    /// Recommendation text for this level
    pub fn recommendation(&self) -> &'static str {
        match self {
            RiskLevel::Low => "approve",
            RiskLevel::Medium => "require additional verification",
            RiskLevel::High => "block",
        }
    }

    /// Label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keystroke dwell-time verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingAnalysis {
    /// Mean dwell time, ms
    pub avg_duration_ms: f64,

    /// Population variance of dwell times, ms²
    pub variance_ms2: f64,

    /// Variance under the consistency threshold
    pub is_consistent: bool,

    /// Paste observed in either session scope
    pub paste_detected: bool,

    /// Behavioral match score (0-100)
    pub score: f64,

    /// Verdict confidence
    pub confidence: Confidence,
}

/// Pointer motion verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerAnalysis {
    /// Mean velocity, px/ms
    pub avg_velocity: f64,

    /// Fraction of smooth consecutive velocity changes (0-1)
    pub smoothness: f64,

    /// Velocity and smoothness within human-like bounds
    pub is_human_like: bool,

    /// Behavioral match score (0-100)
    pub score: f64,

    /// Verdict confidence
    pub confidence: Confidence,
}

/// Behavioral risk for one session snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Session the snapshot was taken from
    pub session_id: Uuid,

    /// Risk score (0-100)
    pub risk_score: f64,

    /// Risk level
    pub risk_level: RiskLevel,

    /// Typing verdict
    pub typing_analysis: TypingAnalysis,

    /// Pointer verdict
    pub pointer_analysis: PointerAnalysis,

    /// Recommendation text
    pub recommendation: String,
}

/// Kind of account transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Cash-in
    Deposit,
    /// Cash-out
    Withdrawal,
    /// Outgoing transfer to another account
    Transfer,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionType::Deposit => "Deposit",
            TransactionType::Withdrawal => "Withdrawal",
            TransactionType::Transfer => "Transfer",
        };
        f.write_str(name)
    }
}

/// Per-factor anomaly scores (each 0-100)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyFactors {
    /// Amount against the account's average and maximum
    pub amount: f64,

    /// Hour of day against the account's usual hours
    pub time: f64,

    /// Transactions in the trailing window
    pub frequency: f64,

    /// External location/device signal
    pub location: f64,
}

/// Anomaly verdict for one transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyAssessment {
    /// Account the transaction belongs to
    pub account_id: String,

    /// Transaction kind
    pub transaction_type: TransactionType,

    /// Score above the anomaly threshold
    pub is_anomaly: bool,

    /// Rounded weighted score (0-100)
    pub anomaly_score: u8,

    /// Factor breakdown
    pub factors: AnomalyFactors,

    /// Recommendation text
    pub recommendation: String,

    /// Human-readable explanation
    pub details: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_boundaries() {
        let config = CombinerConfig::default();

        assert_eq!(RiskLevel::from_score(0.0, &config), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(19.99, &config), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(20.0, &config), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(49.99, &config), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(50.0, &config), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(100.0, &config), RiskLevel::High);
    }

    #[test]
    fn test_recommendations() {
        assert_eq!(RiskLevel::Low.recommendation(), "approve");
        assert_eq!(RiskLevel::Medium.recommendation(), "require additional verification");
        assert_eq!(RiskLevel::High.recommendation(), "block");
    }

    #[test]
    fn test_input_event_wire_format() {
        let event: InputEvent =
            serde_json::from_str(r#"{"kind":"pointer_move","x":10.0,"y":4.5,"t":1200}"#).unwrap();
        assert_eq!(event, InputEvent::PointerMove { x: 10.0, y: 4.5, t: 1200 });
        assert_eq!(event.timestamp(), 1200);

        let level = serde_json::to_string(&RiskLevel::Medium).unwrap();
        assert_eq!(level, "\"MEDIUM\"");
    }
}
