//! Pointer velocity/smoothness classifier

use crate::config::PointerConfig;
use crate::signals::Session;
use crate::types::{Confidence, PointerAnalysis};

/// Classifies pointer motion from buffered move samples
#[derive(Debug, Clone, Default)]
pub struct PointerAnalyzer {
    config: PointerConfig,
}

impl PointerAnalyzer {
    /// Create new pointer analyzer
    pub fn new(config: PointerConfig) -> Self {
        Self { config }
    }

    /// Analyze the session's pointer samples. Clicks and touches carry no
    /// velocity and are skipped.
    pub fn analyze(&self, session: &Session) -> PointerAnalysis {
        let velocities: Vec<f64> = session.pointer_samples().filter_map(|s| s.velocity).collect();
        self.analyze_velocities(&velocities)
    }

    /// Classify a velocity series, px/ms, oldest first
    pub fn analyze_velocities(&self, velocities: &[f64]) -> PointerAnalysis {
        if velocities.len() < self.config.min_samples.max(2) {
            return PointerAnalysis {
                avg_velocity: 0.0,
                smoothness: 0.0,
                is_human_like: false,
                score: self.config.insufficient_score,
                confidence: Confidence::Low,
            };
        }

        let avg_velocity = velocities.iter().sum::<f64>() / velocities.len() as f64;
        let smoothness = self.smoothness(velocities);
        let is_human_like = avg_velocity > self.config.min_velocity
            && avg_velocity < self.config.max_velocity
            && smoothness > self.config.min_smoothness;

        PointerAnalysis {
            avg_velocity,
            smoothness,
            is_human_like,
            score: if is_human_like {
                self.config.human_score
            } else {
                self.config.non_human_score
            },
            confidence: if is_human_like {
                Confidence::High
            } else {
                Confidence::Medium
            },
        }
    }

    /// Fraction of consecutive pairs whose velocity change stays under the jump limit
    fn smoothness(&self, velocities: &[f64]) -> f64 {
        let pairs = velocities.len().saturating_sub(1);
        if pairs == 0 {
            return 0.0;
        }
        let smooth = velocities
            .windows(2)
            .filter(|w| (w[1] - w[0]).abs() < self.config.smooth_jump)
            .count();
        smooth as f64 / pairs as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SignalConfig;
    use crate::signals::SignalSink;

    #[test]
    fn test_too_few_samples() {
        let analysis = PointerAnalyzer::default().analyze_velocities(&[1.0; 9]);
        assert_eq!(analysis.score, 0.0);
        assert_eq!(analysis.confidence, Confidence::Low);
    }

    #[test]
    fn test_human_like_motion() {
        let analysis = PointerAnalyzer::default().analyze_velocities(&[1.0; 10]);
        assert!(analysis.is_human_like);
        assert_eq!(analysis.smoothness, 1.0);
        assert_eq!(analysis.score, 100.0);
        assert_eq!(analysis.confidence, Confidence::High);
    }

    #[test]
    fn test_jerky_motion() {
        let velocities: Vec<f64> = (0..10).map(|i| if i % 2 == 0 { 0.5 } else { 4.0 }).collect();
        let analysis = PointerAnalyzer::default().analyze_velocities(&velocities);
        assert_eq!(analysis.smoothness, 0.0);
        assert!(!analysis.is_human_like);
        assert_eq!(analysis.score, 50.0);
        assert_eq!(analysis.confidence, Confidence::Medium);
    }

    #[test]
    fn test_velocity_band() {
        let analyzer = PointerAnalyzer::default();
        assert!(!analyzer.analyze_velocities(&[5.0; 12]).is_human_like);
        assert!(!analyzer.analyze_velocities(&[0.05; 12]).is_human_like);
        assert!(analyzer.analyze_velocities(&[4.99; 12]).is_human_like);
    }

    #[test]
    fn test_clicks_are_excluded() {
        let mut session = Session::new(&SignalConfig::default(), 0);
        for i in 0..9 {
            session.record_pointer(i as f64 * 10.0, 0.0, i * 10);
        }
        for i in 0..5 {
            session.record_click(0.0, 0.0, 100 + i);
        }
        let analysis = PointerAnalyzer::default().analyze(&session);
        assert_eq!(analysis.confidence, Confidence::Low);

        session.record_pointer(100.0, 0.0, 200);
        let analysis = PointerAnalyzer::default().analyze(&session);
        assert_ne!(analysis.confidence, Confidence::Low);
    }
}
