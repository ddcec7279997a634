//! Keystroke dwell-time classifier

use crate::config::TypingConfig;
use crate::signals::Session;
use crate::types::{Confidence, TypingAnalysis};

/// Classifies typing rhythm from finalized keystrokes
#[derive(Debug, Clone, Default)]
pub struct TypingAnalyzer {
    config: TypingConfig,
}

impl TypingAnalyzer {
    /// Create new typing analyzer
    pub fn new(config: TypingConfig) -> Self {
        Self { config }
    }

    /// Analyze the session's keystrokes.
    ///
    /// A paste in either session scope overrides every timing signal.
    pub fn analyze(&self, session: &Session) -> TypingAnalysis {
        if session.paste_detected() {
            return TypingAnalysis {
                avg_duration_ms: 0.0,
                variance_ms2: 0.0,
                is_consistent: false,
                paste_detected: true,
                score: self.config.paste_score,
                confidence: Confidence::High,
            };
        }

        let durations: Vec<f64> = session
            .keystrokes()
            .iter()
            .filter_map(|k| k.duration_ms)
            .filter(|d| *d > 0)
            .map(|d| d as f64)
            .collect();

        self.analyze_durations(&durations)
    }

    /// Classify a set of positive dwell times, ms
    pub fn analyze_durations(&self, durations: &[f64]) -> TypingAnalysis {
        if durations.len() < self.config.min_keystrokes.max(1) {
            return TypingAnalysis {
                avg_duration_ms: 0.0,
                variance_ms2: 0.0,
                is_consistent: false,
                paste_detected: false,
                score: self.config.insufficient_score,
                confidence: Confidence::Low,
            };
        }

        let n = durations.len() as f64;
        let avg = durations.iter().sum::<f64>() / n;
        let variance = durations.iter().map(|d| (d - avg).powi(2)).sum::<f64>() / n;
        let is_consistent = variance < self.config.variance_threshold_ms2;

        TypingAnalysis {
            avg_duration_ms: avg,
            variance_ms2: variance,
            is_consistent,
            paste_detected: false,
            score: if is_consistent {
                self.config.consistent_score
            } else {
                self.config.inconsistent_score
            },
            confidence: if is_consistent {
                Confidence::High
            } else {
                Confidence::Medium
            },
        }
    }
}
