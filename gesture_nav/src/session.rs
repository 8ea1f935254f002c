//! Detection session: classifier, dispatch gate and navigator for as long as
//! detection stays switched on.
//!
//! `DetectionSession` owns every piece of mutable state a session needs (the
//! gate's debounce memory, the navigator's page state, the status line), so
//! stopping a session is just dropping or resetting it.

use std::sync::atomic::{AtomicBool, Ordering};

use gesture_rules::{classify_with, GestureLabel, Thresholds};
use tracing::{debug, info, warn};

use crate::action::{Action, Navigator};
use crate::config::NavConfig;
use crate::gate::DispatchGate;
use crate::source::{LandmarkSource, SourceEvent};

// ════════════════════════════════════════════════════════════════════════════
// SessionStatus
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    /// No detector output seen yet.
    Loading,
    /// Detection switched off.
    Paused,
    /// Detector running, no gesture in the latest frame.
    Waiting,
    /// The latest frame classified as this gesture.
    Detected(GestureLabel),
    /// The detector failed on the latest cycle.
    Unavailable(String),
}

// ════════════════════════════════════════════════════════════════════════════
// RunSummary
// ════════════════════════════════════════════════════════════════════════════

/// Counters over a session's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Detector cycles that produced a frame (with or without a hand).
    pub frames:      usize,
    /// Frames that contained a hand.
    pub hands:       usize,
    pub dispatched:  usize,
    /// Gestures dropped by the debounce window.
    pub suppressed:  usize,
    pub unavailable: usize,
}

// ════════════════════════════════════════════════════════════════════════════
// DetectionSession
// ════════════════════════════════════════════════════════════════════════════

pub struct DetectionSession<N: Navigator> {
    thresholds: Thresholds,
    gate:       DispatchGate,
    navigator:  N,
    enabled:    bool,
    last_label: GestureLabel,
    status:     SessionStatus,
    summary:    RunSummary,
}

impl<N: Navigator> DetectionSession<N> {
    pub fn new(cfg: &NavConfig, navigator: N) -> Self {
        let enabled = cfg.detection.enabled;
        DetectionSession {
            thresholds: cfg.thresholds,
            gate:       DispatchGate::new(cfg.dispatch.cooldown()),
            navigator,
            enabled,
            last_label: GestureLabel::None,
            status:     if enabled { SessionStatus::Loading } else { SessionStatus::Paused },
            summary:    RunSummary::default(),
        }
    }

    // ── process one SourceEvent ──────────────────────────────────────────

    /// Classify, gate and dispatch one detector event.  Returns the action
    /// performed, if any.  Does nothing while detection is switched off.
    pub fn handle(&mut self, event: SourceEvent) -> Option<Action> {
        if !self.enabled {
            return None;
        }

        match event {
            SourceEvent::Unavailable { at, reason } => {
                warn!("landmark source unavailable at {:?}: {}", at, reason);
                self.summary.unavailable += 1;
                self.status = SessionStatus::Unavailable(reason);
                None
            }

            SourceEvent::Frame { at, frame } => {
                self.summary.frames += 1;
                if frame.is_some() {
                    self.summary.hands += 1;
                }

                let label = classify_with(frame.as_ref(), &self.thresholds);
                if label != self.last_label {
                    debug!("classified {} at {:?}", label, at);
                    self.last_label = label;
                }
                self.status = match label {
                    GestureLabel::None => SessionStatus::Waiting,
                    other              => SessionStatus::Detected(other),
                };

                let action = self.gate.on_frame(label, at);
                match action {
                    Some(action) => {
                        info!("{} at {:?} → {:?}", label, at, action);
                        self.summary.dispatched += 1;
                        self.navigator.perform(action);
                    }
                    None if !label.is_none() => self.summary.suppressed += 1,
                    None => {}
                }
                action
            }
        }
    }

    // ── lifecycle ────────────────────────────────────────────────────────

    /// Switching off discards the debounce state; switching back on starts
    /// from an idle gate.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.enabled {
            return;
        }
        self.enabled = enabled;
        self.gate.reset();
        self.last_label = GestureLabel::None;
        self.status = if enabled { SessionStatus::Waiting } else { SessionStatus::Paused };
        info!("gesture detection {}", if enabled { "enabled" } else { "paused" });
    }

    pub fn toggle(&mut self) {
        self.set_enabled(!self.enabled);
    }

    // ── accessors ────────────────────────────────────────────────────────

    pub fn is_enabled(&self)     -> bool            { self.enabled }
    pub fn status(&self)         -> &SessionStatus  { &self.status }
    pub fn summary(&self)        -> RunSummary      { self.summary }
    pub fn gate(&self)           -> &DispatchGate   { &self.gate }
    pub fn navigator(&self)      -> &N              { &self.navigator }
    pub fn navigator_mut(&mut self) -> &mut N       { &mut self.navigator }
    pub fn into_navigator(self)  -> N               { self.navigator }

    /// One-line, human-readable status.
    pub fn status_message(&self) -> String {
        match &self.status {
            SessionStatus::Loading            => "Loading handpose model...".to_string(),
            SessionStatus::Paused             => "Gesture detection paused".to_string(),
            SessionStatus::Waiting            => "Waiting for gesture...".to_string(),
            SessionStatus::Unavailable(why)   => format!("Error: {}", why),
            SessionStatus::Detected(label)    => {
                let name = match label {
                    GestureLabel::SwipeLeft  => "Swipe Left",
                    GestureLabel::SwipeRight => "Swipe Right",
                    GestureLabel::OpenPalm   => "Open Palm",
                    GestureLabel::Pinch      => "Pinch",
                    GestureLabel::Fist       => "Fist",
                    GestureLabel::Victory    => "Victory Sign",
                    GestureLabel::ThumbsUp   => "Thumbs Up",
                    GestureLabel::None       => return "Waiting for gesture...".to_string(),
                };
                match Action::for_label(*label) {
                    Some(action) => format!("{} Detected - {}", name, action.describe()),
                    None         => format!("{} Detected", name),
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run_session() — the driving loop
// ════════════════════════════════════════════════════════════════════════════

/// Pull events from `source` into `session` until the source is exhausted or
/// `stop` is raised.  `stop` is checked before every event, so nothing is
/// dispatched once it is set.
pub fn run_session<S, N>(
    source:  &mut S,
    session: &mut DetectionSession<N>,
    stop:    &AtomicBool,
) -> RunSummary
where
    S: LandmarkSource + ?Sized,
    N: Navigator,
{
    while !stop.load(Ordering::Relaxed) {
        let Some(event) = source.poll() else { break };
        if stop.load(Ordering::Relaxed) {
            break;
        }
        session.handle(event);
    }
    session.summary()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{RecordingNavigator, ViewportNavigator};
    use crate::gate::GateState;
    use gesture_rules::poses::pose;
    use std::time::Duration;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn session() -> DetectionSession<RecordingNavigator> {
        DetectionSession::new(&NavConfig::default(), RecordingNavigator::default())
    }

    fn frame(label: GestureLabel, at: u64) -> SourceEvent {
        SourceEvent::Frame { at: ms(at), frame: Some(pose(label)) }
    }

    /// Replays a fixed list of events.
    struct Scripted(std::vec::IntoIter<SourceEvent>);

    impl LandmarkSource for Scripted {
        fn poll(&mut self) -> Option<SourceEvent> {
            self.0.next()
        }
    }

    #[test]
    fn starts_loading_then_waiting() {
        let mut s = session();
        assert_eq!(*s.status(), SessionStatus::Loading);
        s.handle(SourceEvent::Frame { at: ms(0), frame: None });
        assert_eq!(s.status_message(), "Waiting for gesture...");
    }

    #[test]
    fn held_gesture_dispatches_once_per_window() {
        let mut s = session();
        for t in (0..1500).step_by(16) {
            s.handle(frame(GestureLabel::SwipeLeft, t));
        }
        assert_eq!(s.navigator().performed, vec![Action::HistoryBack, Action::HistoryBack]);
        let sum = s.summary();
        assert_eq!(sum.dispatched, 2);
        assert_eq!(sum.frames, sum.dispatched + sum.suppressed);
    }

    #[test]
    fn status_names_gesture_and_action() {
        let mut s = session();
        s.handle(frame(GestureLabel::Pinch, 0));
        assert_eq!(*s.status(), SessionStatus::Detected(GestureLabel::Pinch));
        assert_eq!(s.status_message(), "Pinch Detected - Zooming In");
        s.handle(frame(GestureLabel::Victory, 100));
        assert_eq!(s.status_message(), "Victory Sign Detected - Scrolling Up");
    }

    #[test]
    fn unavailable_is_not_a_gesture() {
        let mut s = session();
        let before = *s.gate().debounce_state();
        let out = s.handle(SourceEvent::Unavailable { at: ms(5), reason: "inference failed".into() });
        assert_eq!(out, None);
        assert_eq!(s.status_message(), "Error: inference failed");
        assert_eq!(*s.gate().debounce_state(), before);
        assert!(s.navigator().performed.is_empty());

        // The session keeps going on the next good frame.
        assert_eq!(s.handle(frame(GestureLabel::ThumbsUp, 10)), Some(Action::Reload));
        assert_eq!(s.summary().unavailable, 1);
    }

    #[test]
    fn disabled_session_ignores_frames() {
        let mut cfg = NavConfig::default();
        cfg.detection.enabled = false;
        let mut s = DetectionSession::new(&cfg, RecordingNavigator::default());
        assert_eq!(s.status_message(), "Gesture detection paused");
        assert_eq!(s.handle(frame(GestureLabel::Fist, 0)), None);
        assert_eq!(s.summary(), RunSummary::default());
    }

    #[test]
    fn pausing_discards_debounce_state() {
        let mut s = session();
        assert!(s.handle(frame(GestureLabel::OpenPalm, 0)).is_some());
        assert_eq!(s.gate().state_at(ms(10)), GateState::Cooling);

        s.set_enabled(false);
        assert_eq!(s.gate().state_at(ms(10)), GateState::Idle);
        assert_eq!(s.handle(frame(GestureLabel::OpenPalm, 20)), None);

        s.toggle();
        assert!(s.is_enabled());
        // Still inside the old window, but the window was discarded.
        assert_eq!(s.handle(frame(GestureLabel::OpenPalm, 30)), Some(Action::ScrollDown));
    }

    #[test]
    fn run_session_drives_viewport() {
        let events = vec![
            frame(GestureLabel::OpenPalm, 0),
            frame(GestureLabel::OpenPalm, 500),
            frame(GestureLabel::OpenPalm, 1000),
            SourceEvent::Frame { at: ms(1500), frame: None },
            frame(GestureLabel::Pinch, 2100),
            frame(GestureLabel::Fist, 2600),
            frame(GestureLabel::Fist, 3200),
        ];
        let nav = ViewportNavigator::new("home", &NavConfig::default().dispatch);
        let mut s = DetectionSession::new(&NavConfig::default(), nav);
        let stop = AtomicBool::new(false);
        let sum = run_session(&mut Scripted(events.into_iter()), &mut s, &stop);

        assert_eq!(sum.frames, 7);
        assert_eq!(sum.hands, 6);
        assert_eq!(sum.dispatched, 4);
        assert_eq!(sum.suppressed, 2);
        let v = s.into_navigator();
        assert_eq!(v.scroll_y(), 100.0);
        assert_eq!(v.zoom(), 1.0);
    }

    #[test]
    fn stop_flag_prevents_dispatch() {
        let mut s = session();
        let stop = AtomicBool::new(true);
        let mut src = Scripted(vec![frame(GestureLabel::Fist, 0)].into_iter());
        let sum = run_session(&mut src, &mut s, &stop);
        assert_eq!(sum, RunSummary::default());
        assert!(s.navigator().performed.is_empty());
    }
}
