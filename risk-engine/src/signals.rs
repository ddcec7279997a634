//! Signal buffer for one interaction session
//!
//! A [`Session`] holds two nested scopes:
//!
//! - the **interaction scope**: keystrokes, pointer samples and a paste flag,
//!   cleared by [`Session::reset_interaction`] on every screen change;
//! - the **login scope**: a paste flag/counter and the last evaluated risk
//!   score, surviving interaction resets and cleared only by
//!   [`Session::reset_full`] (logout, or re-entering the login screen).
//!
//! Nothing recorded here is ever rejected; timestamps are taken as given.

use crate::config::SignalConfig;
use crate::types::{InputEvent, Millis, RiskAssessment};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Push-based port the telemetry collector feeds
pub trait SignalSink {
    /// Key pressed at `t`
    fn record_key_down(&mut self, key: &str, t: Millis);

    /// Key released at `t`
    fn record_key_up(&mut self, key: &str, t: Millis);

    /// Paste observed at `t`. Callers only forward pastes from login inputs.
    fn record_paste(&mut self, t: Millis);

    /// Pointer (or touch) moved to `(x, y)` at `t`
    fn record_pointer(&mut self, x: f64, y: f64, t: Millis);

    /// Pointer clicked at `(x, y)`
    fn record_click(&mut self, x: f64, y: f64, t: Millis);

    /// Touch started at `(x, y)`
    fn record_touch(&mut self, x: f64, y: f64, t: Millis);

    /// Dispatch a tagged event to the matching `record_*` call
    fn record(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown { key, t } => self.record_key_down(key, *t),
            InputEvent::KeyUp { key, t } => self.record_key_up(key, *t),
            InputEvent::Paste { t } => self.record_paste(*t),
            InputEvent::PointerMove { x, y, t } => self.record_pointer(*x, *y, *t),
            InputEvent::PointerClick { x, y, t } => self.record_click(*x, *y, *t),
            InputEvent::Touch { x, y, t } => self.record_touch(*x, *y, *t),
        }
    }
}

/// One key press, finalized once its release is seen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keystroke {
    /// Key identifier
    pub key: String,

    /// Press time
    pub pressed_at: Millis,

    /// Dwell time, set on release
    pub duration_ms: Option<i64>,
}

/// How a pointer sample was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleKind {
    /// Motion sample
    Move,
    /// Click position
    Click,
    /// Touch start position
    Touch,
}

/// Pointer position sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    /// Sample kind
    pub kind: SampleKind,
    /// X coordinate, px
    pub x: f64,
    /// Y coordinate, px
    pub y: f64,
    /// Sample time
    pub t: Millis,
    /// Velocity from the previous sample, px/ms (moves only)
    pub velocity: Option<f64>,
}

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Nothing recorded since the last reset
    Idle,
    /// Events arriving
    Collecting,
    /// An assessment was noted after the last event
    Evaluated,
}

#[derive(Debug, Clone)]
struct InteractionScope {
    keystrokes: Vec<Keystroke>,
    pointer: VecDeque<PointerSample>,
    paste_detected: bool,
    paste_count: u32,
    started_at: Millis,
    events: u64,
    evaluated_after: Option<u64>,
}

impl InteractionScope {
    fn new(started_at: Millis) -> Self {
        Self {
            keystrokes: Vec::new(),
            pointer: VecDeque::new(),
            paste_detected: false,
            paste_count: 0,
            started_at,
            events: 0,
            evaluated_after: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct LoginScope {
    paste_detected: bool,
    paste_count: u32,
    last_risk_score: Option<f64>,
}

/// Behavioral telemetry for one login/interaction context
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    pointer_capacity: usize,
    interaction: InteractionScope,
    login: LoginScope,
}

impl Session {
    /// Create an empty session starting at `started_at`
    pub fn new(config: &SignalConfig, started_at: Millis) -> Self {
        Self {
            id: Uuid::new_v4(),
            pointer_capacity: config.pointer_capacity.max(1),
            interaction: InteractionScope::new(started_at),
            login: LoginScope::default(),
        }
    }

    /// Session identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Start of the current interaction scope
    pub fn start_time(&self) -> Millis {
        self.interaction.started_at
    }

    /// All keystrokes of the interaction scope, in press order
    pub fn keystrokes(&self) -> &[Keystroke] {
        &self.interaction.keystrokes
    }

    /// Pointer samples of the interaction scope, oldest first
    pub fn pointer_samples(&self) -> impl Iterator<Item = &PointerSample> + '_ {
        self.interaction.pointer.iter()
    }

    /// Number of buffered pointer samples
    pub fn pointer_len(&self) -> usize {
        self.interaction.pointer.len()
    }

    /// Paste seen in the interaction scope
    pub fn interaction_paste_detected(&self) -> bool {
        self.interaction.paste_detected
    }

    /// Paste seen anywhere in the login scope
    pub fn login_paste_detected(&self) -> bool {
        self.login.paste_detected
    }

    /// Paste seen in either scope
    pub fn paste_detected(&self) -> bool {
        self.interaction.paste_detected || self.login.paste_detected
    }

    /// Pastes in the interaction scope
    pub fn interaction_paste_count(&self) -> u32 {
        self.interaction.paste_count
    }

    /// Pastes in the login scope
    pub fn login_paste_count(&self) -> u32 {
        self.login.paste_count
    }

    /// Last noted risk score, cleared by a full reset
    pub fn last_risk_score(&self) -> Option<f64> {
        self.login.last_risk_score
    }

    /// Lifecycle state
    pub fn state(&self) -> SessionState {
        match (self.interaction.events, self.interaction.evaluated_after) {
            (0, _) => SessionState::Idle,
            (events, Some(seen)) if seen == events => SessionState::Evaluated,
            _ => SessionState::Collecting,
        }
    }

    /// Store the outcome of an evaluation. Does not touch the buffers.
    pub fn note_assessment(&mut self, assessment: &RiskAssessment) {
        self.login.last_risk_score = Some(assessment.risk_score);
        self.interaction.evaluated_after = Some(self.interaction.events);
    }

    /// Routine reset on a screen/context change; login scope survives
    pub fn reset_interaction(&mut self, now: Millis) {
        self.interaction = InteractionScope::new(now);
        info!(session_id = %self.id, "Interaction scope reset");
    }

    /// Full reset on logout or login-screen re-entry
    pub fn reset_full(&mut self, now: Millis) {
        self.interaction = InteractionScope::new(now);
        self.login = LoginScope::default();
        info!(session_id = %self.id, "Session fully reset");
    }

    fn push_sample(&mut self, kind: SampleKind, x: f64, y: f64, t: Millis) {
        let velocity = match kind {
            SampleKind::Move => Some(self.velocity_to(x, y, t)),
            SampleKind::Click | SampleKind::Touch => None,
        };

        self.interaction.pointer.push_back(PointerSample { kind, x, y, t, velocity });
        while self.interaction.pointer.len() > self.pointer_capacity {
            self.interaction.pointer.pop_front();
        }
        self.interaction.events += 1;
    }

    /// Distance from the previous sample over elapsed time, 1ms floor
    fn velocity_to(&self, x: f64, y: f64, t: Millis) -> f64 {
        match self.interaction.pointer.back() {
            Some(prev) => {
                let distance = (x - prev.x).hypot(y - prev.y);
                let elapsed = t.saturating_sub(prev.t).max(1) as f64;
                distance / elapsed
            }
            None => 0.0,
        }
    }
}

impl SignalSink for Session {
    fn record_key_down(&mut self, key: &str, t: Millis) {
        self.interaction.keystrokes.push(Keystroke {
            key: key.to_string(),
            pressed_at: t,
            duration_ms: None,
        });
        self.interaction.events += 1;
    }

    fn record_key_up(&mut self, key: &str, t: Millis) {
        let pending = self
            .interaction
            .keystrokes
            .iter_mut()
            .rev()
            .find(|k| k.duration_ms.is_none() && k.key == key);

        match pending {
            Some(keystroke) => {
                keystroke.duration_ms = Some(t.saturating_sub(keystroke.pressed_at));
                self.interaction.events += 1;
            }
            None => debug!(session_id = %self.id, "Key release without pending press"),
        }
    }

    fn record_paste(&mut self, _t: Millis) {
        self.interaction.paste_detected = true;
        self.interaction.paste_count += 1;
        self.login.paste_detected = true;
        self.login.paste_count += 1;
        self.interaction.events += 1;

        warn!(
            session_id = %self.id,
            paste_count = self.login.paste_count,
            "Paste detected during login"
        );
    }

    fn record_pointer(&mut self, x: f64, y: f64, t: Millis) {
        self.push_sample(SampleKind::Move, x, y, t);
    }

    fn record_click(&mut self, x: f64, y: f64, t: Millis) {
        self.push_sample(SampleKind::Click, x, y, t);
    }

    fn record_touch(&mut self, x: f64, y: f64, t: Millis) {
        self.push_sample(SampleKind::Touch, x, y, t);
    }
}
