//! Behavior Risk Engine
//!
//! Session risk scoring from interaction telemetry (keystroke dwell times,
//! pointer motion, paste events) and per-account transaction anomaly scoring.
//!
//! # Architecture
//!
//! - **Signal buffer**: one [`Session`] per login/interaction context
//! - **Analyzers**: typing and pointer classifiers, pure over a session snapshot
//! - **Combiner**: weighted behavioral risk score and level
//! - **Pattern store**: per-account rolling statistics, single writer per account
//! - **Anomaly detector**: amount/time/frequency/location factors
//! - **Policies**: allow / step-up / block for login and transaction flows

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod anomaly;
pub mod combiner;
pub mod config;
pub mod engine;
pub mod error;
pub mod location;
pub mod metrics;
pub mod patterns;
pub mod pointer;
pub mod policy;
pub mod signals;
pub mod types;
pub mod typing;

pub use anomaly::AnomalyDetector;
pub use combiner::SessionRiskCombiner;
pub use config::Config;
pub use engine::{LoginVerdict, RiskEngine, TransactionVerdict};
pub use error::{Error, Result};
pub use location::{FixedLocationSignal, LocationSignal, RandomLocationSignal};
pub use patterns::{AccountPattern, AccountPatternStore};
pub use pointer::PointerAnalyzer;
pub use policy::{Decision, LoginPolicy, ReviewBadge, TransactionPolicy};
pub use signals::{Session, SessionState, SignalSink};
pub use types::*;
pub use typing::TypingAnalyzer;
