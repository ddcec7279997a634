//! Transaction anomaly detector
//!
//! Scores a transaction against its account's rolling pattern, then folds it
//! into the pattern. Factors:
//!
//! | factor    | weight | tiers                                          |
//! |-----------|--------|------------------------------------------------|
//! | amount    | 0.4    | >2×max → 100, >1.5×max → 70, >3×avg → 50       |
//! | time      | 0.2    | night hours → 80, unusual hour → 40            |
//! | frequency | 0.3    | >5 in window → 90, >3 → 60                     |
//! | location  | 0.1    | external signal                                |

use crate::config::AnomalyConfig;
use crate::location::{LocationSignal, RandomLocationSignal};
use crate::patterns::{AccountPattern, AccountPatternStore, TransactionRecord};
use crate::types::{AnomalyAssessment, AnomalyFactors, TransactionType};
use chrono::{DateTime, FixedOffset, Timelike, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

/// Scores transactions against per-account patterns
pub struct AnomalyDetector {
    config: AnomalyConfig,
    store: Arc<AccountPatternStore>,
    location: Box<dyn LocationSignal>,
}

impl AnomalyDetector {
    /// Create a detector with its own store and the random location placeholder
    pub fn new(config: AnomalyConfig) -> Self {
        let store = Arc::new(AccountPatternStore::new(config.clone()));
        Self::with_parts(config, store, Box::new(RandomLocationSignal::default()))
    }

    /// Create a detector over a shared store and a specific location source
    pub fn with_parts(
        config: AnomalyConfig,
        store: Arc<AccountPatternStore>,
        location: Box<dyn LocationSignal>,
    ) -> Self {
        Self {
            config,
            store,
            location,
        }
    }

    /// Swap the location factor source
    pub fn set_location_signal(&mut self, location: Box<dyn LocationSignal>) {
        self.location = location;
    }

    /// Underlying pattern store
    pub fn store(&self) -> &Arc<AccountPatternStore> {
        &self.store
    }

    /// Hour of day of `time` in the configured offset
    pub fn hour_of(&self, time: DateTime<Utc>) -> u32 {
        match FixedOffset::east_opt(self.config.utc_offset_minutes * 60) {
            Some(offset) => time.with_timezone(&offset).hour(),
            None => time.hour(),
        }
    }

    /// Score a transaction and record it into the account's pattern
    pub fn analyze(
        &self,
        account_id: &str,
        transaction_type: TransactionType,
        amount: Decimal,
        time: DateTime<Utc>,
    ) -> AnomalyAssessment {
        let hour = self.hour_of(time);
        let location = self
            .location
            .location_anomaly(account_id, transaction_type, amount, time)
            .clamp(0.0, 100.0);

        let factors = self.store.with_pattern(account_id, |pattern, capacity| {
            let factors = AnomalyFactors {
                amount: self.amount_anomaly(amount, pattern),
                time: self.time_anomaly(hour, pattern),
                frequency: self.frequency_anomaly(time, pattern),
                location,
            };

            pattern.record(
                TransactionRecord {
                    account_id: account_id.to_string(),
                    transaction_type,
                    amount,
                    time,
                },
                hour,
                capacity,
            );

            factors
        });

        let weighted = factors.amount * self.config.amount_weight
            + factors.time * self.config.time_weight
            + factors.frequency * self.config.frequency_weight
            + factors.location * self.config.location_weight;
        let anomaly_score = weighted.round().clamp(0.0, 100.0) as u8;
        let is_anomaly = anomaly_score > self.config.anomaly_threshold;

        let assessment = AnomalyAssessment {
            account_id: account_id.to_string(),
            transaction_type,
            is_anomaly,
            anomaly_score,
            factors,
            recommendation: recommendation(anomaly_score).to_string(),
            details: details(&factors),
        };

        if is_anomaly {
            warn!(
                account_id,
                transaction_type = %transaction_type,
                anomaly_score,
                details = %assessment.details,
                "Anomalous transaction"
            );
        } else {
            info!(account_id, transaction_type = %transaction_type, anomaly_score, "Transaction scored");
        }

        assessment
    }

    fn amount_anomaly(&self, amount: Decimal, pattern: &AccountPattern) -> f64 {
        if exceeds(amount, pattern.max_amount, Decimal::from(2)) {
            100.0
        } else if exceeds(amount, pattern.max_amount, Decimal::new(15, 1)) {
            70.0
        } else if exceeds(amount, pattern.avg_amount, Decimal::from(3)) {
            50.0
        } else {
            0.0
        }
    }

    fn time_anomaly(&self, hour: u32, pattern: &AccountPattern) -> f64 {
        if (self.config.night_start_hour..=self.config.night_end_hour).contains(&hour) {
            80.0
        } else if !pattern.common_hours.contains(&hour) {
            40.0
        } else {
            0.0
        }
    }

    /// Counted before the current transaction joins the history
    fn frequency_anomaly(&self, time: DateTime<Utc>, pattern: &AccountPattern) -> f64 {
        match pattern.recent_count(time, self.config.frequency_window_ms) {
            n if n > 5 => 90.0,
            n if n > 3 => 60.0,
            _ => 0.0,
        }
    }
}

impl std::fmt::Debug for AnomalyDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnomalyDetector")
            .field("config", &self.config)
            .field("tracked_accounts", &self.store.tracked_accounts())
            .finish()
    }
}

/// `amount > base * factor`. A product past the `Decimal` range lies beyond
/// every representable amount in the direction of `base`'s sign.
fn exceeds(amount: Decimal, base: Decimal, factor: Decimal) -> bool {
    match base.checked_mul(factor) {
        Some(limit) => amount > limit,
        None => base.is_sign_negative(),
    }
}

fn recommendation(score: u8) -> &'static str {
    match score {
        s if s < 30 => "normal",
        s if s < 60 => "unusual, proceed with caution",
        _ => "high risk, require additional verification",
    }
}

/// Location never appears in the explanation
fn details(factors: &AnomalyFactors) -> String {
    let mut flags = Vec::new();
    if factors.amount > 50.0 {
        flags.push("unusually large amount");
    }
    if factors.time > 50.0 {
        flags.push("unusual transaction time");
    }
    if factors.frequency > 50.0 {
        flags.push("high transaction frequency");
    }

    if flags.is_empty() {
        "normal transaction pattern".to_string()
    } else {
        flags.join(", ")
    }
}
