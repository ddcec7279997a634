//! Risk replay binary
//!
//! Replays a JSON-lines file of telemetry and transaction records through the
//! engine and prints every verdict as one JSON line.
//!
//! Usage: `risk-replay <records.jsonl | -> [config.toml]`

use anyhow::{Context, Result};
use behavior_risk::{Config, InputEvent, Millis, RiskEngine, SignalSink, TransactionType};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::{BufRead, BufReader, Write};

/// One replayed line
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ReplayRecord {
    /// Telemetry event for the current session
    Event { event: InputEvent },

    /// Evaluate the current session as a login attempt
    EvaluateLogin,

    /// Screen change
    ResetInteraction { t: Millis },

    /// Logout or login-screen re-entry
    ResetFull { t: Millis },

    /// Transaction to score
    Transaction {
        account_id: String,
        transaction_type: TransactionType,
        amount: Decimal,
        time: DateTime<Utc>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Logs go to stderr; stdout carries the verdicts
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if std::env::var("RISK_LOG_JSON").map(|v| v == "1").unwrap_or(false) {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&String>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path).with_context(|| format!("loading config {}", path)),
        None => Config::from_env().context("loading config from environment"),
    }
}

fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let input = args.first().map(String::as_str).unwrap_or("-");
    let config = load_config(args.get(1))?;

    tracing::info!(input, "Starting risk replay");

    let reader: Box<dyn BufRead> = if input == "-" {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let file = std::fs::File::open(input).with_context(|| format!("opening {}", input))?;
        Box::new(BufReader::new(file))
    };

    let engine = RiskEngine::new(config)?;
    let mut session = engine.new_session(0);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", index + 1))?;
        if line.trim().is_empty() {
            continue;
        }

        let record: ReplayRecord = serde_json::from_str(&line)
            .map_err(|e| behavior_risk::Error::Parse(format!("line {}: {}", index + 1, e)))?;

        match record {
            ReplayRecord::Event { event } => session.record(&event),
            ReplayRecord::EvaluateLogin => {
                let verdict = engine.evaluate_login(&mut session);
                writeln!(out, "{}", serde_json::to_string(&verdict)?)?;
            }
            ReplayRecord::ResetInteraction { t } => session.reset_interaction(t),
            ReplayRecord::ResetFull { t } => session.reset_full(t),
            ReplayRecord::Transaction {
                account_id,
                transaction_type,
                amount,
                time,
            } => {
                let verdict = engine.evaluate_transaction(&account_id, transaction_type, amount, time);
                writeln!(out, "{}", serde_json::to_string(&verdict)?)?;
            }
        }
    }

    out.flush()?;

    if std::env::var("RISK_REPLAY_METRICS").map(|v| v == "1").unwrap_or(false) {
        eprint!("{}", engine.metrics().gather_text()?);
    }

    tracing::info!(
        tracked_accounts = engine.patterns().tracked_accounts(),
        "Replay complete"
    );
    Ok(())
}
