//! Location factor sources
//!
//! The location factor is an extension point for a geolocation or
//! device-fingerprint signal. Until one is wired in, production uses a
//! low random value.

use crate::types::TransactionType;
use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;

/// Source of the location anomaly factor (0-100)
pub trait LocationSignal: Send + Sync {
    /// Score the transaction's location/device against the account
    fn location_anomaly(
        &self,
        account_id: &str,
        transaction_type: TransactionType,
        amount: Decimal,
        time: DateTime<Utc>,
    ) -> f64;
}

/// Uniform random placeholder in `[0, upper)`
#[derive(Debug, Clone)]
pub struct RandomLocationSignal {
    upper: f64,
}

impl RandomLocationSignal {
    /// Create a placeholder with the given exclusive upper bound
    pub fn new(upper: f64) -> Self {
        Self { upper }
    }
}

impl Default for RandomLocationSignal {
    fn default() -> Self {
        Self::new(20.0)
    }
}

impl LocationSignal for RandomLocationSignal {
    fn location_anomaly(&self, _: &str, _: TransactionType, _: Decimal, _: DateTime<Utc>) -> f64 {
        if self.upper <= 0.0 {
            return 0.0;
        }
        rand::thread_rng().gen_range(0.0..self.upper)
    }
}

/// Constant factor, for tests and replays
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocationSignal(pub f64);

impl LocationSignal for FixedLocationSignal {
    fn location_anomaly(&self, _: &str, _: TransactionType, _: Decimal, _: DateTime<Utc>) -> f64 {
        self.0
    }
}
