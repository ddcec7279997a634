//! Risk engine facade
//!
//! Wires the combiner, the anomaly detector and both decision policies
//! together. Sessions are owned by the caller, one per login/interaction
//! context; the pattern store is shared by every transaction.

use crate::anomaly::AnomalyDetector;
use crate::combiner::SessionRiskCombiner;
use crate::config::Config;
use crate::location::LocationSignal;
use crate::metrics::Metrics;
use crate::patterns::AccountPatternStore;
use crate::policy::{Decision, LoginPolicy, ReviewBadge, TransactionPolicy};
use crate::signals::Session;
use crate::types::{AnomalyAssessment, Millis, RiskAssessment, TransactionType};
use crate::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Behavioral verdict for a login attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginVerdict {
    /// Behavioral assessment
    pub assessment: RiskAssessment,

    /// Policy outcome
    pub decision: Decision,
}

/// Anomaly verdict for a transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionVerdict {
    /// Anomaly assessment
    pub assessment: AnomalyAssessment,

    /// Policy outcome
    pub decision: Decision,

    /// Badge stored with the transaction record
    pub badge: ReviewBadge,
}

/// Behavior risk engine
#[derive(Debug)]
pub struct RiskEngine {
    config: Config,
    combiner: SessionRiskCombiner,
    detector: AnomalyDetector,
    login_policy: LoginPolicy,
    transaction_policy: TransactionPolicy,
    metrics: Metrics,
}

impl RiskEngine {
    /// Create new engine
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            combiner: SessionRiskCombiner::new(&config),
            detector: AnomalyDetector::new(config.anomaly.clone()),
            login_policy: LoginPolicy::new(config.policy.clone()),
            transaction_policy: TransactionPolicy::new(config.policy.clone()),
            metrics: Metrics::new()?,
            config,
        })
    }

    /// Create new engine with a specific location factor source
    pub fn with_location_signal(config: Config, location: Box<dyn LocationSignal>) -> Result<Self> {
        let mut engine = Self::new(config)?;
        engine.detector.set_location_signal(location);
        Ok(engine)
    }

    /// Open a new session
    pub fn new_session(&self, started_at: Millis) -> Session {
        Session::new(&self.config.signals, started_at)
    }

    /// Pure behavioral assessment of a session
    pub fn assess_session(&self, session: &Session) -> RiskAssessment {
        self.combiner.assess(session)
    }

    /// Evaluate a login attempt. Routine interaction resets are the caller's
    /// job; the login scope stays until `Session::reset_full`.
    pub fn evaluate_login(&self, session: &mut Session) -> LoginVerdict {
        let assessment = self.combiner.evaluate(session);
        let decision = self.login_policy.decide(&assessment);

        self.metrics.record_session(&assessment);
        self.metrics.record_decision("login", decision);
        info!(session_id = %assessment.session_id, decision = decision.as_str(), "Login decided");

        LoginVerdict { assessment, decision }
    }

    /// Score a transaction, fold it into the account pattern and decide
    pub fn evaluate_transaction(
        &self,
        account_id: &str,
        transaction_type: TransactionType,
        amount: Decimal,
        time: DateTime<Utc>,
    ) -> TransactionVerdict {
        let assessment = self.detector.analyze(account_id, transaction_type, amount, time);
        let decision = self.transaction_policy.decide(&assessment);
        let badge = ReviewBadge::for_score(assessment.anomaly_score);

        self.metrics.record_anomaly(&assessment);
        self.metrics.record_decision("transaction", decision);

        TransactionVerdict {
            assessment,
            decision,
            badge,
        }
    }

    /// Shared account pattern store
    pub fn patterns(&self) -> &Arc<AccountPatternStore> {
        self.detector.store()
    }

    /// Engine metrics
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::FixedLocationSignal;
    use crate::signals::SignalSink;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn engine() -> RiskEngine {
        RiskEngine::with_location_signal(Config::default(), Box::new(FixedLocationSignal(0.0))).unwrap()
    }

    #[test]
    fn test_pasted_login_steps_up() {
        let engine = engine();
        let mut session = engine.new_session(0);
        session.record_paste(100);

        let verdict = engine.evaluate_login(&mut session);
        assert!(verdict.assessment.typing_analysis.paste_detected);
        assert_eq!(verdict.decision, Decision::StepUp);
        assert_eq!(engine.metrics().paste_events.get(), 1);
    }

    #[test]
    fn test_transaction_verdict() {
        let engine = engine();
        let time = Utc.with_ymd_and_hms(2024, 6, 1, 3, 0, 0).unwrap();
        let verdict = engine.evaluate_transaction("ACC001", TransactionType::Withdrawal, dec!(2000), time);

        assert_eq!(verdict.assessment.anomaly_score, 56);
        assert_eq!(verdict.decision, Decision::Allow);
        assert_eq!(verdict.badge, ReviewBadge::Monitored);
        assert_eq!(engine.patterns().tracked_accounts(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.anomaly.history_capacity = 0;
        assert!(RiskEngine::new(config).is_err());
    }
}
