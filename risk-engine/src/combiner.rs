//! Session risk combiner
//!
//! Merges the typing and pointer verdicts into one behavioral risk score.
//! [`SessionRiskCombiner::assess`] is a pure read of the session snapshot;
//! calling it twice without new events yields the same assessment.

use crate::config::{CombinerConfig, Config};
use crate::pointer::PointerAnalyzer;
use crate::signals::Session;
use crate::types::{RiskAssessment, RiskLevel};
use crate::typing::TypingAnalyzer;
use tracing::info;

/// Combines behavioral analyzers into a risk assessment
#[derive(Debug, Clone, Default)]
pub struct SessionRiskCombiner {
    typing: TypingAnalyzer,
    pointer: PointerAnalyzer,
    config: CombinerConfig,
}

impl SessionRiskCombiner {
    /// Create new combiner from the engine configuration
    pub fn new(config: &Config) -> Self {
        Self {
            typing: TypingAnalyzer::new(config.typing.clone()),
            pointer: PointerAnalyzer::new(config.pointer.clone()),
            config: config.combiner.clone(),
        }
    }

    /// Assess the current session snapshot
    pub fn assess(&self, session: &Session) -> RiskAssessment {
        let typing_analysis = self.typing.analyze(session);
        let pointer_analysis = self.pointer.analyze(session);

        let combined = typing_analysis.score * self.config.typing_weight
            + pointer_analysis.score * self.config.pointer_weight;
        let risk_score = (100.0 - combined).clamp(0.0, 100.0);
        let risk_level = RiskLevel::from_score(risk_score, &self.config);

        RiskAssessment {
            session_id: session.id(),
            risk_score,
            risk_level,
            typing_analysis,
            pointer_analysis,
            recommendation: risk_level.recommendation().to_string(),
        }
    }

    /// Assess and store the score on the session
    pub fn evaluate(&self, session: &mut Session) -> RiskAssessment {
        let assessment = self.assess(session);
        session.note_assessment(&assessment);

        info!(
            session_id = %assessment.session_id,
            risk_score = assessment.risk_score,
            risk_level = %assessment.risk_level,
            paste_detected = assessment.typing_analysis.paste_detected,
            "Session risk evaluated"
        );

        assessment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SignalConfig;
    use crate::signals::{SessionState, SignalSink};
    use crate::types::Confidence;

    fn human_session() -> Session {
        let mut session = Session::new(&SignalConfig::default(), 0);
        for i in 0..4 {
            let key = format!("{}", i);
            session.record_key_down(&key, i * 300);
            session.record_key_up(&key, i * 300 + 110);
        }
        for i in 0..15 {
            session.record_pointer(i as f64 * 20.0, 0.0, 2_000 + i * 20);
        }
        session
    }

    #[test]
    fn test_empty_session_is_high_risk() {
        let session = Session::new(&SignalConfig::default(), 0);
        let assessment = SessionRiskCombiner::default().assess(&session);

        // typing 50 * 0.4 + pointer 0 * 0.6 = 20
        assert_eq!(assessment.risk_score, 80.0);
        assert_eq!(assessment.risk_level, RiskLevel::High);
        assert_eq!(assessment.recommendation, "block");
        assert_eq!(assessment.typing_analysis.confidence, Confidence::Low);
        assert_eq!(assessment.pointer_analysis.confidence, Confidence::Low);
    }

    #[test]
    fn test_human_session_is_low_risk() {
        let assessment = SessionRiskCombiner::default().assess(&human_session());
        assert_eq!(assessment.risk_score, 0.0);
        assert_eq!(assessment.risk_level, RiskLevel::Low);
        assert_eq!(assessment.recommendation, "approve");
    }

    #[test]
    fn test_paste_raises_risk() {
        let mut session = human_session();
        session.record_paste(5_000);
        let assessment = SessionRiskCombiner::default().assess(&session);

        // 100 - (10 * 0.4 + 100 * 0.6) = 36
        assert!((assessment.risk_score - 36.0).abs() < 1e-9);
        assert_eq!(assessment.risk_level, RiskLevel::Medium);
        assert_eq!(assessment.recommendation, "require additional verification");
    }

    #[test]
    fn test_assess_is_idempotent() {
        let session = human_session();
        let combiner = SessionRiskCombiner::default();
        assert_eq!(combiner.assess(&session), combiner.assess(&session));
    }

    #[test]
    fn test_evaluate_tracks_lifecycle() {
        let combiner = SessionRiskCombiner::default();
        let mut session = Session::new(&SignalConfig::default(), 0);
        assert_eq!(session.state(), SessionState::Idle);

        session.record_pointer(1.0, 1.0, 10);
        assert_eq!(session.state(), SessionState::Collecting);

        let assessment = combiner.evaluate(&mut session);
        assert_eq!(session.state(), SessionState::Evaluated);
        assert_eq!(session.last_risk_score(), Some(assessment.risk_score));

        session.record_pointer(2.0, 2.0, 20);
        assert_eq!(session.state(), SessionState::Collecting);

        session.reset_interaction(30);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.last_risk_score().is_some());

        session.reset_full(40);
        assert_eq!(session.last_risk_score(), None);
    }
}
