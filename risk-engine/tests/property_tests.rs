//! Property-based tests for scoring invariants
//!
//! - Risk and anomaly scores stay within 0-100
//! - Assessing an unchanged session is idempotent
//! - Paste overrides every typing signal
//! - Pointer buffer and account history never exceed their capacity

use behavior_risk::{
    AnomalyDetector, AccountPatternStore, Config, FixedLocationSignal, InputEvent,
    SessionRiskCombiner, Session, SignalSink, TransactionType, TypingAnalyzer,
};
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Strategy for generating arbitrary telemetry events
fn event_strategy() -> impl Strategy<Value = InputEvent> {
    let key = prop_oneof![Just("a"), Just("b"), Just("c"), Just("Enter")].prop_map(String::from);
    let t = 0i64..100_000;
    let coord = -500.0f64..2_000.0;

    prop_oneof![
        (key.clone(), t.clone()).prop_map(|(key, t)| InputEvent::KeyDown { key, t }),
        (key, t.clone()).prop_map(|(key, t)| InputEvent::KeyUp { key, t }),
        (coord.clone(), coord.clone(), t.clone()).prop_map(|(x, y, t)| InputEvent::PointerMove { x, y, t }),
        (coord.clone(), coord.clone(), t.clone()).prop_map(|(x, y, t)| InputEvent::PointerClick { x, y, t }),
        (coord.clone(), coord, t).prop_map(|(x, y, t)| InputEvent::Touch { x, y, t }),
    ]
}

/// Strategy for generating transaction amounts (non-negative, cents)
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0u64..10_000_00u64).prop_map(|cents| Decimal::new(cents as i64, 2))
}

fn transaction_type_strategy() -> impl Strategy<Value = TransactionType> {
    prop_oneof![
        Just(TransactionType::Deposit),
        Just(TransactionType::Withdrawal),
        Just(TransactionType::Transfer),
    ]
}

fn replay(events: &[InputEvent]) -> Session {
    let mut session = Session::new(&Config::default().signals, 0);
    for event in events {
        session.record(event);
    }
    session
}

proptest! {
    #[test]
    fn prop_risk_score_bounded(events in prop::collection::vec(event_strategy(), 0..200)) {
        let session = replay(&events);
        let assessment = SessionRiskCombiner::default().assess(&session);
        prop_assert!((0.0..=100.0).contains(&assessment.risk_score));
    }

    #[test]
    fn prop_assess_is_idempotent(events in prop::collection::vec(event_strategy(), 0..200)) {
        let session = replay(&events);
        let combiner = SessionRiskCombiner::default();
        prop_assert_eq!(combiner.assess(&session), combiner.assess(&session));
    }

    #[test]
    fn prop_typing_score_is_a_known_tier(events in prop::collection::vec(event_strategy(), 0..200)) {
        let session = replay(&events);
        let score = TypingAnalyzer::default().analyze(&session).score;
        prop_assert!([50.0, 60.0, 100.0].contains(&score));
    }

    #[test]
    fn prop_paste_overrides_typing(
        events in prop::collection::vec(event_strategy(), 0..200),
        paste_at in 0i64..100_000,
        resets in 0usize..3,
    ) {
        let mut session = replay(&events);
        session.record_paste(paste_at);
        for i in 0..resets {
            session.reset_interaction(paste_at + i as i64);
            for event in &events {
                session.record(event);
            }
        }

        let analysis = TypingAnalyzer::default().analyze(&session);
        prop_assert!(analysis.paste_detected);
        prop_assert_eq!(analysis.score, 10.0);
    }

    #[test]
    fn prop_pointer_buffer_bounded(events in prop::collection::vec(event_strategy(), 0..400)) {
        let session = replay(&events);
        prop_assert!(session.pointer_len() <= Config::default().signals.pointer_capacity);
    }

    #[test]
    fn prop_anomaly_score_bounded_and_history_capped(
        txs in prop::collection::vec(
            (amount_strategy(), transaction_type_strategy(), 0i64..7_200_000),
            1..150,
        ),
        location in 0.0f64..20.0,
    ) {
        let config = Config::default().anomaly;
        let store = Arc::new(AccountPatternStore::new(config.clone()));
        let detector = AnomalyDetector::with_parts(
            config.clone(),
            Arc::clone(&store),
            Box::new(FixedLocationSignal(location)),
        );
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let mut offset = 0i64;
        for (amount, kind, gap) in &txs {
            offset += gap;
            let assessment = detector.analyze("ACC001", *kind, *amount, base + Duration::milliseconds(offset));
            prop_assert!(assessment.anomaly_score <= 100);
            prop_assert_eq!(assessment.is_anomaly, assessment.anomaly_score > 60);
        }

        let pattern = store.get("ACC001");
        prop_assert!(pattern.history.len() <= config.history_capacity);
        prop_assert_eq!(pattern.transaction_count, txs.len() as u64);
        prop_assert!(pattern.max_amount >= config.seed_max_amount);
    }
}
