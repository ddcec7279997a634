//! Metrics collection for observability
//!
//! # Metrics
//!
//! - `risk_session_assessments_total{level}` - Behavioral assessments by risk level
//! - `risk_paste_events_total` - Login evaluations that saw a paste
//! - `risk_anomaly_assessments_total{recommendation}` - Scored transactions
//! - `risk_anomalies_flagged_total` - Transactions above the anomaly threshold
//! - `risk_anomaly_score` - Histogram of anomaly scores
//! - `risk_decisions_total{flow,decision}` - Policy outcomes

use crate::policy::Decision;
use crate::types::{AnomalyAssessment, RiskAssessment};
use crate::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Behavioral assessments by level
    pub session_assessments: IntCounterVec,

    /// Evaluations with paste detected
    pub paste_events: IntCounter,

    /// Scored transactions by recommendation
    pub anomaly_assessments: IntCounterVec,

    /// Transactions flagged as anomalous
    pub anomalies_flagged: IntCounter,

    /// Anomaly score distribution
    pub anomaly_score: Histogram,

    /// Decisions by flow and outcome
    pub decisions: IntCounterVec,

    registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector on a private registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());

        let session_assessments = IntCounterVec::new(
            Opts::new("risk_session_assessments_total", "Behavioral assessments by risk level"),
            &["level"],
        )?;
        registry.register(Box::new(session_assessments.clone()))?;

        let paste_events = IntCounter::new(
            "risk_paste_events_total",
            "Login evaluations that saw a paste",
        )?;
        registry.register(Box::new(paste_events.clone()))?;

        let anomaly_assessments = IntCounterVec::new(
            Opts::new("risk_anomaly_assessments_total", "Scored transactions by recommendation"),
            &["recommendation"],
        )?;
        registry.register(Box::new(anomaly_assessments.clone()))?;

        let anomalies_flagged = IntCounter::new(
            "risk_anomalies_flagged_total",
            "Transactions above the anomaly threshold",
        )?;
        registry.register(Box::new(anomalies_flagged.clone()))?;

        let anomaly_score = Histogram::with_opts(
            HistogramOpts::new("risk_anomaly_score", "Histogram of anomaly scores")
                .buckets(vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0]),
        )?;
        registry.register(Box::new(anomaly_score.clone()))?;

        let decisions = IntCounterVec::new(
            Opts::new("risk_decisions_total", "Policy outcomes by flow"),
            &["flow", "decision"],
        )?;
        registry.register(Box::new(decisions.clone()))?;

        Ok(Self {
            session_assessments,
            paste_events,
            anomaly_assessments,
            anomalies_flagged,
            anomaly_score,
            decisions,
            registry,
        })
    }

    /// Record a behavioral assessment
    pub fn record_session(&self, assessment: &RiskAssessment) {
        self.session_assessments
            .with_label_values(&[assessment.risk_level.as_str()])
            .inc();
        if assessment.typing_analysis.paste_detected {
            self.paste_events.inc();
        }
    }

    /// Record a transaction assessment
    pub fn record_anomaly(&self, assessment: &AnomalyAssessment) {
        self.anomaly_assessments
            .with_label_values(&[assessment.recommendation.as_str()])
            .inc();
        self.anomaly_score.observe(f64::from(assessment.anomaly_score));
        if assessment.is_anomaly {
            self.anomalies_flagged.inc();
        }
    }

    /// Record a policy outcome
    pub fn record_decision(&self, flow: &str, decision: Decision) {
        self.decisions.with_label_values(&[flow, decision.as_str()]).inc();
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render the registry in the text exposition format
    pub fn gather_text(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| crate::Error::Parse(e.to_string()))
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("paste_events", &self.paste_events.get())
            .field("anomalies_flagged", &self.anomalies_flagged.get())
            .finish()
    }
}
