//! Configuration for the behavior risk engine
//!
//! Every threshold used by the analyzers and the anomaly detector lives here.
//! `Default` reproduces the production heuristics exactly.

use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Signal buffer limits
    pub signals: SignalConfig,

    /// Keystroke dwell-time classifier
    pub typing: TypingConfig,

    /// Pointer velocity classifier
    pub pointer: PointerConfig,

    /// Behavioral score combination
    pub combiner: CombinerConfig,

    /// Transaction anomaly scoring
    pub anomaly: AnomalyConfig,

    /// Decision policies
    pub policy: PolicyConfig,
}

/// Signal buffer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Pointer samples kept per interaction session (oldest evicted)
    pub pointer_capacity: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            pointer_capacity: 50,
        }
    }
}

/// Typing analyzer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingConfig {
    /// Minimum finalized keystrokes before dwell statistics are trusted
    pub min_keystrokes: usize,

    /// Dwell variance (ms²) below which typing counts as consistent
    pub variance_threshold_ms2: f64,

    /// Score reported whenever a paste was detected
    pub paste_score: f64,

    /// Score reported when there is not enough evidence
    pub insufficient_score: f64,

    /// Score for consistent typing
    pub consistent_score: f64,

    /// Score for inconsistent typing
    pub inconsistent_score: f64,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            min_keystrokes: 3,
            variance_threshold_ms2: 5000.0,
            paste_score: 10.0,
            insufficient_score: 50.0,
            consistent_score: 100.0,
            inconsistent_score: 60.0,
        }
    }
}

/// Pointer analyzer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Minimum samples carrying a velocity
    pub min_samples: usize,

    /// Lower (exclusive) bound of human-like mean velocity, px/ms
    pub min_velocity: f64,

    /// Upper (exclusive) bound of human-like mean velocity, px/ms
    pub max_velocity: f64,

    /// Velocity change between consecutive samples that still counts as smooth
    pub smooth_jump: f64,

    /// Smoothness (exclusive) floor for human-like movement
    pub min_smoothness: f64,

    /// Score reported when there is not enough evidence
    pub insufficient_score: f64,

    /// Score for human-like movement
    pub human_score: f64,

    /// Score for non human-like movement
    pub non_human_score: f64,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            min_samples: 10,
            min_velocity: 0.1,
            max_velocity: 5.0,
            smooth_jump: 2.0,
            min_smoothness: 0.5,
            insufficient_score: 0.0,
            human_score: 100.0,
            non_human_score: 50.0,
        }
    }
}

/// Session risk combiner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombinerConfig {
    /// Weight of the typing score
    pub typing_weight: f64,

    /// Weight of the pointer score
    pub pointer_weight: f64,

    /// Risk scores strictly below this are LOW
    pub low_below: f64,

    /// Risk scores strictly below this (and not LOW) are MEDIUM
    pub medium_below: f64,
}

impl Default for CombinerConfig {
    fn default() -> Self {
        Self {
            typing_weight: 0.4,
            pointer_weight: 0.6,
            low_below: 20.0,
            medium_below: 50.0,
        }
    }
}

/// Anomaly detector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Seed running mean for an unseen account
    pub seed_avg_amount: Decimal,

    /// Seed running max for an unseen account
    pub seed_max_amount: Decimal,

    /// Seed set of usual hours for an unseen account
    pub seed_common_hours: BTreeSet<u32>,

    /// Transactions kept per account (oldest evicted)
    pub history_capacity: usize,

    /// Trailing frequency window, milliseconds (exclusive)
    pub frequency_window_ms: i64,

    /// First hour of the late-night band (inclusive)
    pub night_start_hour: u32,

    /// Last hour of the late-night band (inclusive)
    pub night_end_hour: u32,

    /// Offset applied to transaction timestamps before taking the hour
    pub utc_offset_minutes: i32,

    /// Weight of the amount factor
    pub amount_weight: f64,

    /// Weight of the time factor
    pub time_weight: f64,

    /// Weight of the frequency factor
    pub frequency_weight: f64,

    /// Weight of the location factor
    pub location_weight: f64,

    /// Scores strictly above this are anomalies
    pub anomaly_threshold: u8,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            seed_avg_amount: Decimal::from(100),
            seed_max_amount: Decimal::from(500),
            seed_common_hours: (9..=17).collect(),
            history_capacity: 100,
            frequency_window_ms: 3_600_000,
            night_start_hour: 1,
            night_end_hour: 5,
            utc_offset_minutes: 0,
            amount_weight: 0.4,
            time_weight: 0.2,
            frequency_weight: 0.3,
            location_weight: 0.1,
            anomaly_threshold: 60,
        }
    }
}

/// Decision policy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Login risk scores strictly above this require step-up
    pub login_step_up_above: f64,

    /// Login risk scores at or above this are blocked outright
    pub login_block_at: Option<f64>,

    /// Withdrawal anomaly scores strictly above this require step-up
    pub withdrawal_step_up_above: u8,

    /// Transfer anomaly scores strictly above this require step-up
    pub transfer_step_up_above: u8,

    /// Anomaly scores at or above this are blocked outright
    pub transaction_block_at: Option<u8>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            login_step_up_above: 70.0,
            login_block_at: None,
            withdrawal_step_up_above: 70,
            transfer_step_up_above: 60,
            transaction_block_at: None,
        }
    }
}

impl Config {
    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(offset) = std::env::var("RISK_ENGINE_TZ_OFFSET_MINUTES") {
            config.anomaly.utc_offset_minutes = parse_var("RISK_ENGINE_TZ_OFFSET_MINUTES", &offset)?;
        }

        if let Ok(capacity) = std::env::var("RISK_ENGINE_POINTER_CAPACITY") {
            config.signals.pointer_capacity = parse_var("RISK_ENGINE_POINTER_CAPACITY", &capacity)?;
        }

        if let Ok(capacity) = std::env::var("RISK_ENGINE_HISTORY_CAPACITY") {
            config.anomaly.history_capacity = parse_var("RISK_ENGINE_HISTORY_CAPACITY", &capacity)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the scoring formulas cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.signals.pointer_capacity == 0 {
            return Err(Error::Config("signals.pointer_capacity must be > 0".to_string()));
        }
        if self.anomaly.history_capacity == 0 {
            return Err(Error::Config("anomaly.history_capacity must be > 0".to_string()));
        }
        if self.combiner.low_below > self.combiner.medium_below {
            return Err(Error::Config(format!(
                "combiner.low_below ({}) exceeds combiner.medium_below ({})",
                self.combiner.low_below, self.combiner.medium_below
            )));
        }

        let weights = [
            ("combiner.typing_weight", self.combiner.typing_weight),
            ("combiner.pointer_weight", self.combiner.pointer_weight),
            ("anomaly.amount_weight", self.anomaly.amount_weight),
            ("anomaly.time_weight", self.anomaly.time_weight),
            ("anomaly.frequency_weight", self.anomaly.frequency_weight),
            ("anomaly.location_weight", self.anomaly.location_weight),
        ];
        for (name, weight) in weights {
            if !(0.0..=1.0).contains(&weight) {
                return Err(Error::Config(format!("{} must be within [0, 1], got {}", name, weight)));
            }
        }

        if self.anomaly.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(Error::Config(format!(
                "anomaly.utc_offset_minutes out of range: {}",
                self.anomaly.utc_offset_minutes
            )));
        }

        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} has an invalid value: {:?}", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.signals.pointer_capacity, 50);
        assert_eq!(config.anomaly.history_capacity, 100);
        assert_eq!(config.anomaly.seed_common_hours.len(), 9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [typing]
            variance_threshold_ms2 = 2500.0

            [anomaly]
            utc_offset_minutes = 120
            "#,
        )
        .unwrap();

        assert_eq!(config.typing.variance_threshold_ms2, 2500.0);
        assert_eq!(config.typing.min_keystrokes, 3);
        assert_eq!(config.anomaly.utc_offset_minutes, 120);
        assert_eq!(config.anomaly.frequency_window_ms, 3_600_000);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.signals.pointer_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.combiner.low_below = 60.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.anomaly.location_weight = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("risk.toml");
        std::fs::write(
            &path,
            r#"
            [signals]
            pointer_capacity = 80

            [policy]
            transfer_step_up_above = 55
            "#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.signals.pointer_capacity, 80);
        assert_eq!(config.policy.transfer_step_up_above, 55);
        assert_eq!(config.anomaly.history_capacity, 100);

        std::fs::write(&path, "[anomaly]\nhistory_capacity = 0\n").unwrap();
        assert!(matches!(Config::from_file(&path), Err(Error::Config(_))));

        let missing = temp_dir.path().join("missing.toml");
        assert!(matches!(Config::from_file(&missing), Err(Error::Io(_))));
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("RISK_ENGINE_POINTER_CAPACITY", "many");
        assert!(matches!(Config::from_env(), Err(Error::Config(_))));

        std::env::set_var("RISK_ENGINE_POINTER_CAPACITY", " 64 ");
        std::env::set_var("RISK_ENGINE_TZ_OFFSET_MINUTES", "-300");
        let config = Config::from_env().unwrap();
        assert_eq!(config.signals.pointer_capacity, 64);
        assert_eq!(config.anomaly.utc_offset_minutes, -300);

        std::env::remove_var("RISK_ENGINE_POINTER_CAPACITY");
        std::env::remove_var("RISK_ENGINE_TZ_OFFSET_MINUTES");
    }
}
