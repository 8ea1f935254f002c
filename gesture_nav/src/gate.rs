//! Debounce / dispatch gate.
//!
//! Turns a per-frame stream of labels into one-shot actions.  After any
//! dispatch the gate is **Cooling** for `cooldown`; labels arriving in that
//! window are dropped, whatever gesture they name.  The window is checked
//! lazily on the next frame, so no timer runs.
//!
//! ```text
//!   Idle ──(label ≠ None)──▶ fire, Cooling
//!   Cooling ──(now - last_fired_at ≥ cooldown)──▶ Idle
//! ```
//!
//! Timestamps are offsets from the start of the detection session.

use std::time::Duration;

use gesture_rules::GestureLabel;
use tracing::debug;

use crate::action::Action;

/// What the gate remembers between frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebounceState {
    pub last_label:    Option<GestureLabel>,
    pub last_fired_at: Option<Duration>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Cooling,
}

#[derive(Clone, Debug)]
pub struct DispatchGate {
    cooldown: Duration,
    state:    DebounceState,
}

impl DispatchGate {
    pub fn new(cooldown: Duration) -> Self {
        DispatchGate { cooldown, state: DebounceState::default() }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn debounce_state(&self) -> &DebounceState {
        &self.state
    }

    /// Offer one classified frame.  Returns the action to dispatch, if any.
    pub fn on_frame(&mut self, label: GestureLabel, now: Duration) -> Option<Action> {
        let action = Action::for_label(label)?;

        if self.state_at(now) == GateState::Cooling {
            debug!("suppressed {} at {:?} (cooling)", label, now);
            return None;
        }

        self.state = DebounceState {
            last_label:    Some(label),
            last_fired_at: Some(now),
        };
        Some(action)
    }

    pub fn state_at(&self, now: Duration) -> GateState {
        match self.remaining(now) {
            Some(_) => GateState::Cooling,
            None    => GateState::Idle,
        }
    }

    /// Time left in the current cooling window, if cooling.  A clock that
    /// reads earlier than the last dispatch counts as still cooling.
    pub fn remaining(&self, now: Duration) -> Option<Duration> {
        let fired = self.state.last_fired_at?;
        let elapsed = now.saturating_sub(fired);
        (elapsed < self.cooldown).then(|| self.cooldown - elapsed)
    }

    /// Forget the last dispatch.  Called when the session stops.
    pub fn reset(&mut self) {
        self.state = DebounceState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn gate() -> DispatchGate {
        DispatchGate::new(ms(1000))
    }

    #[test]
    fn none_never_fires_and_leaves_state() {
        let mut g = gate();
        assert_eq!(g.on_frame(GestureLabel::None, ms(0)), None);
        assert_eq!(*g.debounce_state(), DebounceState::default());
        assert_eq!(g.state_at(ms(0)), GateState::Idle);
    }

    #[test]
    fn first_gesture_fires_immediately() {
        let mut g = gate();
        assert_eq!(g.on_frame(GestureLabel::SwipeLeft, ms(0)), Some(Action::HistoryBack));
        assert_eq!(g.debounce_state().last_label, Some(GestureLabel::SwipeLeft));
        assert_eq!(g.debounce_state().last_fired_at, Some(ms(0)));
    }

    #[test]
    fn repeat_within_window_fires_once() {
        let mut g = gate();
        let fired: Vec<_> = [ms(5000), ms(5400)]
            .into_iter()
            .filter_map(|t| g.on_frame(GestureLabel::SwipeLeft, t))
            .collect();
        assert_eq!(fired, vec![Action::HistoryBack]);
    }

    #[test]
    fn window_is_shared_across_gestures() {
        let mut g = gate();
        assert!(g.on_frame(GestureLabel::Pinch, ms(0)).is_some());
        assert!(g.on_frame(GestureLabel::Fist, ms(999)).is_none());
        // Suppressed frames do not extend the window.
        assert_eq!(g.on_frame(GestureLabel::Fist, ms(1000)), Some(Action::ResetZoom));
    }

    #[test]
    fn same_gesture_fires_again_after_window() {
        let mut g = gate();
        let t = ms(20_000);
        assert_eq!(g.on_frame(GestureLabel::Fist, t), Some(Action::ResetZoom));
        assert_eq!(g.on_frame(GestureLabel::Fist, t + ms(1001)), Some(Action::ResetZoom));
    }

    #[test]
    fn cooling_then_idle() {
        let mut g = gate();
        g.on_frame(GestureLabel::ThumbsUp, ms(100));
        assert_eq!(g.state_at(ms(600)), GateState::Cooling);
        assert_eq!(g.remaining(ms(600)), Some(ms(500)));
        assert_eq!(g.state_at(ms(1100)), GateState::Idle);
        assert_eq!(g.remaining(ms(1100)), None);
    }

    #[test]
    fn clock_going_backwards_stays_cooling() {
        let mut g = gate();
        g.on_frame(GestureLabel::OpenPalm, ms(5000));
        assert!(g.on_frame(GestureLabel::OpenPalm, ms(10)).is_none());
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut g = gate();
        g.on_frame(GestureLabel::Victory, ms(0));
        g.reset();
        assert_eq!(g.state_at(ms(1)), GateState::Idle);
        assert_eq!(g.on_frame(GestureLabel::Victory, ms(1)), Some(Action::ScrollUp));
    }
}
