//! Per-account rolling transaction statistics
//!
//! Patterns are created lazily from the seed defaults and updated by every
//! transaction, anomalous or not. Each account entry is mutated under its
//! map shard lock, so concurrent transactions on one account are serialized
//! while different accounts proceed independently.

use crate::config::AnomalyConfig;
use crate::types::TransactionType;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use tracing::debug;

/// Historical transaction entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Account identifier
    pub account_id: String,

    /// Transaction kind
    pub transaction_type: TransactionType,

    /// Amount
    pub amount: Decimal,

    /// Commit time
    pub time: DateTime<Utc>,
}

/// Rolling statistical profile of one account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountPattern {
    /// Running mean of amounts
    pub avg_amount: Decimal,

    /// Running maximum of amounts
    pub max_amount: Decimal,

    /// Hours of day the account transacts in
    pub common_hours: BTreeSet<u32>,

    /// Transactions recorded
    pub transaction_count: u64,

    /// Most recent transactions, oldest first
    pub history: VecDeque<TransactionRecord>,
}

impl AccountPattern {
    /// Seed pattern for an account never seen before
    pub fn seed(config: &AnomalyConfig) -> Self {
        Self {
            avg_amount: config.seed_avg_amount,
            max_amount: config.seed_max_amount,
            common_hours: config.seed_common_hours.clone(),
            transaction_count: 0,
            history: VecDeque::new(),
        }
    }

    /// Transactions in the trailing window ending at `now` (exclusive)
    pub fn recent_count(&self, now: DateTime<Utc>, window_ms: i64) -> usize {
        self.history
            .iter()
            .filter(|entry| (now - entry.time).num_milliseconds() < window_ms)
            .count()
    }

    /// Fold one transaction into the running statistics
    pub fn record(&mut self, record: TransactionRecord, hour: u32, history_capacity: usize) {
        self.transaction_count += 1;
        let n = Decimal::from(self.transaction_count);
        self.avg_amount = running_mean(self.avg_amount, record.amount, n);
        self.max_amount = self.max_amount.max(record.amount);
        self.common_hours.insert(hour);

        self.history.push_back(record);
        while self.history.len() > history_capacity.max(1) {
            self.history.pop_front();
        }
    }
}

/// Incremental mean after the `n`th sample. Stays inside the `Decimal` range
/// for any pair of representable inputs.
fn running_mean(avg: Decimal, amount: Decimal, n: Decimal) -> Decimal {
    match amount.checked_sub(avg) {
        Some(delta) => avg.checked_add(delta / n).unwrap_or(amount),
        // opposite signs at the edges of the range
        None => avg - avg / n + amount / n,
    }
}

/// Shared store of account patterns
#[derive(Debug)]
pub struct AccountPatternStore {
    config: AnomalyConfig,
    // Map: account_id -> AccountPattern
    patterns: Arc<DashMap<String, AccountPattern>>,
}

impl AccountPatternStore {
    /// Create an empty store
    pub fn new(config: AnomalyConfig) -> Self {
        Self {
            config,
            patterns: Arc::new(DashMap::new()),
        }
    }

    /// Snapshot of the account's pattern, seeding it if unseen
    pub fn get(&self, account_id: &str) -> AccountPattern {
        self.patterns
            .entry(account_id.to_string())
            .or_insert_with(|| AccountPattern::seed(&self.config))
            .value()
            .clone()
    }

    /// Replace an account's pattern (e.g. when restoring from storage)
    pub fn insert(&self, account_id: &str, pattern: AccountPattern) {
        self.patterns.insert(account_id.to_string(), pattern);
    }

    /// Record a transaction unconditionally
    pub fn record_transaction(
        &self,
        account_id: &str,
        transaction_type: TransactionType,
        amount: Decimal,
        time: DateTime<Utc>,
        hour: u32,
    ) {
        self.with_pattern(account_id, |pattern, capacity| {
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
        });
    }

    /// Run `f` with exclusive access to the account's pattern.
    ///
    /// Read-score-update sequences must go through here so that no other
    /// transaction on the same account interleaves.
    pub fn with_pattern<R>(&self, account_id: &str, f: impl FnOnce(&mut AccountPattern, usize) -> R) -> R {
        let mut entry = self
            .patterns
            .entry(account_id.to_string())
            .or_insert_with(|| {
                debug!(account_id, "Seeding account pattern");
                AccountPattern::seed(&self.config)
            });
        f(entry.value_mut(), self.config.history_capacity)
    }

    /// Number of tracked accounts
    pub fn tracked_accounts(&self) -> usize {
        self.patterns.len()
    }
}
