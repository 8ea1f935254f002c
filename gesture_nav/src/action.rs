//! Navigation actions and the collaborator that carries them out.
//!
//! The dispatch gate decides *when* an action fires; a [`Navigator`] decides
//! what firing means.  [`ViewportNavigator`] keeps the page state a browser
//! would (history cursor, scroll offset, zoom) as plain fields owned by one
//! session.  [`RecordingNavigator`] just remembers what it was asked to do.

use gesture_rules::GestureLabel;
use tracing::info;

use crate::config::{DispatchConfig, NavConfig};

// ════════════════════════════════════════════════════════════════════════════
// Action
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    HistoryBack,
    HistoryForward,
    ScrollDown,
    ZoomIn,
    ResetZoom,
    ScrollUp,
    Reload,
}

impl Action {
    /// The action a gesture triggers.  `GestureLabel::None` triggers nothing.
    pub fn for_label(label: GestureLabel) -> Option<Action> {
        match label {
            GestureLabel::None       => None,
            GestureLabel::SwipeLeft  => Some(Action::HistoryBack),
            GestureLabel::SwipeRight => Some(Action::HistoryForward),
            GestureLabel::OpenPalm   => Some(Action::ScrollDown),
            GestureLabel::Pinch      => Some(Action::ZoomIn),
            GestureLabel::Fist       => Some(Action::ResetZoom),
            GestureLabel::Victory    => Some(Action::ScrollUp),
            GestureLabel::ThumbsUp   => Some(Action::Reload),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Action::HistoryBack    => "Going Back",
            Action::HistoryForward => "Going Forward",
            Action::ScrollDown     => "Scrolling Down",
            Action::ZoomIn         => "Zooming In",
            Action::ResetZoom      => "Resetting Zoom",
            Action::ScrollUp       => "Scrolling Up",
            Action::Reload         => "Refreshing Page",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Navigator — abstraction over whatever consumes actions
// ════════════════════════════════════════════════════════════════════════════

pub trait Navigator {
    fn perform(&mut self, action: Action);
}

impl<N: Navigator + ?Sized> Navigator for Box<N> {
    fn perform(&mut self, action: Action) {
        (**self).perform(action);
    }
}

// ── recording backend ─────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingNavigator {
    pub performed: Vec<Action>,
}

impl Navigator for RecordingNavigator {
    fn perform(&mut self, action: Action) {
        self.performed.push(action);
    }
}

// ── viewport backend ──────────────────────────────────────────────────────

/// In-memory page state: history with a cursor, scroll offset, zoom level.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewportNavigator {
    history:      Vec<String>,
    cursor:       usize,
    scroll_y:     f32,
    zoom:         f32,
    reloads:      u32,
    scroll_step:  f32,
    zoom_factor:  f32,
}

impl ViewportNavigator {
    pub const DEFAULT_ZOOM: f32 = 1.0;

    pub fn new(start_page: &str, dispatch: &DispatchConfig) -> Self {
        ViewportNavigator {
            history:     vec![start_page.to_string()],
            cursor:      0,
            scroll_y:    0.0,
            zoom:        Self::DEFAULT_ZOOM,
            reloads:     0,
            scroll_step: dispatch.scroll_step_px,
            zoom_factor: dispatch.zoom_factor,
        }
    }

    /// A navigator whose history already holds `cfg.viewport.pages`, opened
    /// on the last one.  An empty page list starts on `/`.
    pub fn from_config(cfg: &NavConfig) -> Self {
        let mut pages = cfg.viewport.pages.iter();
        let first = pages.next().map_or("/", String::as_str);
        let mut nav = ViewportNavigator::new(first, &cfg.dispatch);
        for page in pages {
            nav.visit(page);
        }
        nav
    }

    /// Navigate to a new page, dropping any forward history.
    pub fn visit(&mut self, page: &str) {
        self.history.truncate(self.cursor + 1);
        self.history.push(page.to_string());
        self.cursor = self.history.len() - 1;
        self.scroll_y = 0.0;
    }

    pub fn current_page(&self) -> &str {
        &self.history[self.cursor]
    }

    /// `(cursor, len)`, 1-based for display.
    pub fn history_position(&self) -> (usize, usize) {
        (self.cursor + 1, self.history.len())
    }

    pub fn scroll_y(&self) -> f32 { self.scroll_y }
    pub fn zoom(&self)     -> f32 { self.zoom }
    pub fn reloads(&self)  -> u32 { self.reloads }

    pub fn summary(&self) -> String {
        let (pos, len) = self.history_position();
        format!(
            "page={} history={}/{} scroll={:.0} zoom={:.2} reloads={}",
            self.current_page(), pos, len, self.scroll_y, self.zoom, self.reloads
        )
    }
}

impl Navigator for ViewportNavigator {
    fn perform(&mut self, action: Action) {
        match action {
            Action::HistoryBack => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.scroll_y = 0.0;
                }
            }
            Action::HistoryForward => {
                if self.cursor + 1 < self.history.len() {
                    self.cursor += 1;
                    self.scroll_y = 0.0;
                }
            }
            Action::ScrollDown => self.scroll_y += self.scroll_step,
            Action::ScrollUp   => self.scroll_y = (self.scroll_y - self.scroll_step).max(0.0),
            Action::ZoomIn     => self.zoom *= self.zoom_factor,
            Action::ResetZoom  => self.zoom = Self::DEFAULT_ZOOM,
            Action::Reload     => {
                self.reloads += 1;
                self.scroll_y = 0.0;
            }
        }
        info!("{:?} → {}", action, self.summary());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> ViewportNavigator {
        ViewportNavigator::new("home", &DispatchConfig::default())
    }

    #[test]
    fn every_gesture_but_none_has_an_action() {
        for label in GestureLabel::ALL {
            assert_eq!(Action::for_label(label).is_none(), label.is_none());
        }
        assert_eq!(Action::for_label(GestureLabel::SwipeLeft), Some(Action::HistoryBack));
        assert_eq!(Action::for_label(GestureLabel::Victory), Some(Action::ScrollUp));
    }

    #[test]
    fn history_back_and_forward() {
        let mut v = viewport();
        v.visit("dashboard");
        v.visit("settings");
        v.perform(Action::HistoryBack);
        assert_eq!(v.current_page(), "dashboard");
        v.perform(Action::HistoryBack);
        v.perform(Action::HistoryBack);
        assert_eq!(v.current_page(), "home");
        v.perform(Action::HistoryForward);
        assert_eq!(v.history_position(), (2, 3));
    }

    #[test]
    fn visit_drops_forward_history() {
        let mut v = viewport();
        v.visit("a");
        v.perform(Action::HistoryBack);
        v.visit("b");
        v.perform(Action::HistoryForward);
        assert_eq!(v.current_page(), "b");
        assert_eq!(v.history_position(), (2, 2));
    }

    #[test]
    fn from_config_seeds_history() {
        let v = ViewportNavigator::from_config(&NavConfig::default());
        assert_eq!(v.current_page(), "/sign-language-mode");
        assert_eq!(v.history_position(), (2, 2));

        let mut cfg = NavConfig::default();
        cfg.viewport.pages.clear();
        let mut v = ViewportNavigator::from_config(&cfg);
        assert_eq!(v.current_page(), "/");
        v.perform(Action::HistoryBack);
        assert_eq!(v.history_position(), (1, 1));
    }

    #[test]
    fn scroll_stops_at_top() {
        let mut v = viewport();
        v.perform(Action::ScrollDown);
        v.perform(Action::ScrollDown);
        assert_eq!(v.scroll_y(), 100.0);
        v.perform(Action::ScrollUp);
        v.perform(Action::ScrollUp);
        v.perform(Action::ScrollUp);
        assert_eq!(v.scroll_y(), 0.0);
    }

    #[test]
    fn zoom_multiplies_and_resets() {
        let mut v = viewport();
        v.perform(Action::ZoomIn);
        v.perform(Action::ZoomIn);
        assert!((v.zoom() - 1.21).abs() < 1e-5);
        v.perform(Action::ResetZoom);
        assert_eq!(v.zoom(), ViewportNavigator::DEFAULT_ZOOM);
    }

    #[test]
    fn reload_counts_and_scrolls_to_top() {
        let mut v = viewport();
        v.perform(Action::ScrollDown);
        v.perform(Action::Reload);
        assert_eq!(v.reloads(), 1);
        assert_eq!(v.scroll_y(), 0.0);
    }

    #[test]
    fn boxed_navigator_forwards() {
        let mut nav: Box<RecordingNavigator> = Box::default();
        nav.perform(Action::Reload);
        assert_eq!(nav.performed, vec![Action::Reload]);
    }
}
