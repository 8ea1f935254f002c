//! # gesture_rules
//!
//! Maps one [`LandmarkFrame`] to a discrete [`GestureLabel`] by walking an
//! ordered decision list.  The first rule whose predicate holds wins; rules
//! overlap, so **order is the tie-break** and is exposed as [`RULES`].
//!
//! | # | Label | Predicate (pixel space, y grows down) |
//! |---|---|---|
//! | 1 | `SwipeRight` | `thumb.x - palm.x > swipe_dx` |
//! | 2 | `SwipeLeft`  | `palm.x - thumb.x > swipe_dx` |
//! | 3 | `Victory`    | index, middle above palm; ring, pinky below palm |
//! | 4 | `OpenPalm`   | index, middle above palm |
//! | 5 | `Pinch`      | `|thumb-index| < pinch_max` and `|thumb-middle| > pinch_middle_min` |
//! | 6 | `Fist`       | index, middle, ring, pinky all within `fist_radius` of palm |
//! | 7 | `ThumbsUp`   | `thumb.y < palm.y - thumbs_up_rise`; index, middle below palm |
//!
//! `Victory` is a strict refinement of `OpenPalm`, so it is checked first;
//! listed after it, it could never fire.
//!
//! Classification is total: a missing palm yields [`GestureLabel::None`], and a
//! rule that needs a missing or malformed digit simply does not match.

use hand_landmarks::{Digit, LandmarkFrame, Point3};
use serde::{Deserialize, Serialize};

pub mod poses;

// ════════════════════════════════════════════════════════════════════════════
// GestureLabel
// ════════════════════════════════════════════════════════════════════════════

/// The closed set of gestures the classifier can report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GestureLabel {
    #[default]
    None,
    SwipeLeft,
    SwipeRight,
    OpenPalm,
    Pinch,
    Fist,
    Victory,
    ThumbsUp,
}

impl GestureLabel {
    pub const ALL: [GestureLabel; 8] = [
        GestureLabel::None,
        GestureLabel::SwipeLeft,
        GestureLabel::SwipeRight,
        GestureLabel::OpenPalm,
        GestureLabel::Pinch,
        GestureLabel::Fist,
        GestureLabel::Victory,
        GestureLabel::ThumbsUp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GestureLabel::None       => "none",
            GestureLabel::SwipeLeft  => "swipe-left",
            GestureLabel::SwipeRight => "swipe-right",
            GestureLabel::OpenPalm   => "open-palm",
            GestureLabel::Pinch      => "pinch",
            GestureLabel::Fist       => "fist",
            GestureLabel::Victory    => "victory",
            GestureLabel::ThumbsUp   => "thumbs-up",
        }
    }

    pub fn is_none(&self) -> bool {
        *self == GestureLabel::None
    }
}

impl std::fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Thresholds
// ════════════════════════════════════════════════════════════════════════════

/// Geometric thresholds, in the same pixel units as the landmarks.
///
/// The defaults were tuned by hand against a 640×480 webcam feed; a different
/// resolution shifts their meaning, so every field can be overridden.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Horizontal thumb-to-palm offset beyond which a swipe is reported.
    pub swipe_dx:         f32,
    /// Thumb-to-index distance below which the fingers are pinched.
    pub pinch_max:        f32,
    /// Thumb-to-middle distance the pinch also requires (middle stays open).
    pub pinch_middle_min: f32,
    /// Fingertip-to-palm distance below which a finger counts as curled.
    pub fist_radius:      f32,
    /// How far above the palm the thumb tip must rise for a thumbs-up.
    pub thumbs_up_rise:   f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            swipe_dx:         50.0,
            pinch_max:        30.0,
            pinch_middle_min: 40.0,
            fist_radius:      60.0,
            thumbs_up_rise:   50.0,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandView — what a rule gets to look at
// ════════════════════════════════════════════════════════════════════════════

/// A frame whose palm is known to be present.
#[derive(Clone, Copy, Debug)]
pub struct HandView<'a> {
    pub palm: Point3,
    frame:    &'a LandmarkFrame,
}

impl<'a> HandView<'a> {
    /// `None` when the frame has no palm: nothing can be evaluated.
    pub fn new(frame: &'a LandmarkFrame) -> Option<Self> {
        Some(HandView { palm: frame.palm()?, frame })
    }

    pub fn tip(&self, digit: Digit) -> Option<Point3> {
        self.frame.tip(digit)
    }

    fn above_palm(&self, digit: Digit) -> Option<bool> {
        Some(self.tip(digit)?.y < self.palm.y)
    }

    fn below_palm(&self, digit: Digit) -> Option<bool> {
        Some(self.tip(digit)?.y > self.palm.y)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Rules
// ════════════════════════════════════════════════════════════════════════════

/// A predicate paired with the label it produces.
///
/// The predicate returns `None` when a landmark it needs is missing; the
/// classifier treats that the same as `Some(false)`.
#[derive(Clone, Copy)]
pub struct Rule {
    pub label: GestureLabel,
    pub test:  fn(&HandView<'_>, &Thresholds) -> Option<bool>,
}

impl Rule {
    pub fn matches(&self, hand: &HandView<'_>, t: &Thresholds) -> bool {
        (self.test)(hand, t).unwrap_or(false)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("label", &self.label).finish()
    }
}

/// The decision list, highest precedence first.
pub const RULES: [Rule; 7] = [
    Rule { label: GestureLabel::SwipeRight, test: swipe_right },
    Rule { label: GestureLabel::SwipeLeft,  test: swipe_left  },
    Rule { label: GestureLabel::Victory,    test: victory     },
    Rule { label: GestureLabel::OpenPalm,   test: open_palm   },
    Rule { label: GestureLabel::Pinch,      test: pinch       },
    Rule { label: GestureLabel::Fist,       test: fist        },
    Rule { label: GestureLabel::ThumbsUp,   test: thumbs_up   },
];

fn swipe_right(h: &HandView<'_>, t: &Thresholds) -> Option<bool> {
    Some(h.tip(Digit::Thumb)?.x - h.palm.x > t.swipe_dx)
}

fn swipe_left(h: &HandView<'_>, t: &Thresholds) -> Option<bool> {
    Some(h.palm.x - h.tip(Digit::Thumb)?.x > t.swipe_dx)
}

fn victory(h: &HandView<'_>, _t: &Thresholds) -> Option<bool> {
    Some(
        h.above_palm(Digit::Index)?
            && h.above_palm(Digit::Middle)?
            && h.below_palm(Digit::Ring)?
            && h.below_palm(Digit::Pinky)?,
    )
}

fn open_palm(h: &HandView<'_>, _t: &Thresholds) -> Option<bool> {
    Some(h.above_palm(Digit::Index)? && h.above_palm(Digit::Middle)?)
}

fn pinch(h: &HandView<'_>, t: &Thresholds) -> Option<bool> {
    let thumb = h.tip(Digit::Thumb)?;
    Some(
        thumb.distance(&h.tip(Digit::Index)?) < t.pinch_max
            && thumb.distance(&h.tip(Digit::Middle)?) > t.pinch_middle_min,
    )
}

fn fist(h: &HandView<'_>, t: &Thresholds) -> Option<bool> {
    for digit in [Digit::Index, Digit::Middle, Digit::Ring, Digit::Pinky] {
        if h.tip(digit)?.distance(&h.palm) >= t.fist_radius {
            return Some(false);
        }
    }
    Some(true)
}

fn thumbs_up(h: &HandView<'_>, t: &Thresholds) -> Option<bool> {
    Some(
        h.tip(Digit::Thumb)?.y < h.palm.y - t.thumbs_up_rise
            && h.below_palm(Digit::Index)?
            && h.below_palm(Digit::Middle)?,
    )
}

// ════════════════════════════════════════════════════════════════════════════
// Classification
// ════════════════════════════════════════════════════════════════════════════

/// Classify with the default [`Thresholds`].
pub fn classify(frame: Option<&LandmarkFrame>) -> GestureLabel {
    classify_with(frame, &Thresholds::default())
}

/// Classify one frame.  `None` (no hand detected) yields [`GestureLabel::None`].
pub fn classify_with(frame: Option<&LandmarkFrame>, t: &Thresholds) -> GestureLabel {
    let Some(hand) = frame.and_then(HandView::new) else {
        return GestureLabel::None;
    };
    RULES
        .iter()
        .find(|rule| rule.matches(&hand, t))
        .map_or(GestureLabel::None, |rule| rule.label)
}

/// Every label whose rule matches, in precedence order.  The first entry (if
/// any) is what [`classify_with`] returns.
pub fn matching_labels(frame: &LandmarkFrame, t: &Thresholds) -> Vec<GestureLabel> {
    let Some(hand) = HandView::new(frame) else {
        return Vec::new();
    };
    RULES
        .iter()
        .filter(|rule| rule.matches(&hand, t))
        .map(|rule| rule.label)
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poses::hand;

    fn p(x: f32, y: f32) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    /// Frame with only a thumb; every other digit empty.
    fn thumb_only(palm: Point3, thumb_tip: Point3) -> LandmarkFrame {
        let full = hand(palm, [thumb_tip; 5]);
        LandmarkFrame::new(
            palm,
            [full.joints(Digit::Thumb).to_vec(), vec![], vec![], vec![], vec![]],
        )
    }

    #[test]
    fn no_hand_is_none() {
        assert_eq!(classify(None), GestureLabel::None);
    }

    #[test]
    fn missing_palm_is_none() {
        // Thumb far to the right would be a swipe if there were a palm.
        let frame = LandmarkFrame::from_annotations(&hand_landmarks::HandAnnotations {
            thumb: vec![p(0.0, 0.0), p(100.0, 0.0), p(200.0, 0.0), p(900.0, 0.0)],
            ..Default::default()
        });
        assert_eq!(classify(Some(&frame)), GestureLabel::None);
        assert!(matching_labels(&frame, &Thresholds::default()).is_empty());
    }

    #[test]
    fn swipe_right_with_other_digits_missing() {
        let frame = thumb_only(p(100.0, 100.0), p(160.0, 100.0));
        assert_eq!(classify(Some(&frame)), GestureLabel::SwipeRight);
    }

    #[test]
    fn swipe_left_mirror() {
        let frame = thumb_only(p(100.0, 100.0), p(40.0, 100.0));
        assert_eq!(classify(Some(&frame)), GestureLabel::SwipeLeft);
    }

    #[test]
    fn swipe_threshold_is_strict() {
        let frame = thumb_only(p(100.0, 100.0), p(150.0, 100.0));
        assert_eq!(classify(Some(&frame)), GestureLabel::None);
    }

    #[test]
    fn swipe_dominates_every_overlapping_rule() {
        let palm = p(100.0, 100.0);
        let frame = hand(palm, [
            p(151.0, 80.0),   // thumb: 51 px right of palm
            p(140.0, 70.0),   // index: pinched against thumb, above palm
            p(100.0, 60.0),   // middle: above palm, away from thumb
            p(110.0, 140.0),  // ring: below palm
            p(120.0, 130.0),  // pinky: below palm
        ]);
        let all = matching_labels(&frame, &Thresholds::default());
        assert_eq!(all, vec![
            GestureLabel::SwipeRight,
            GestureLabel::Victory,
            GestureLabel::OpenPalm,
            GestureLabel::Pinch,
            GestureLabel::Fist,
        ]);
        assert_eq!(classify(Some(&frame)), GestureLabel::SwipeRight);
    }

    #[test]
    fn victory_scenario() {
        let frame = hand(p(100.0, 100.0), [
            p(110.0, 90.0),
            p(95.0, 50.0),
            p(105.0, 50.0),
            p(110.0, 150.0),
            p(115.0, 150.0),
        ]);
        assert_eq!(classify(Some(&frame)), GestureLabel::Victory);
    }

    #[test]
    fn open_palm_when_ring_also_raised() {
        let frame = hand(p(100.0, 100.0), [
            p(110.0, 90.0),
            p(95.0, 20.0),
            p(105.0, 10.0),
            p(115.0, 20.0),
            p(125.0, 150.0),
        ]);
        assert_eq!(classify(Some(&frame)), GestureLabel::OpenPalm);
    }

    #[test]
    fn thumbs_up_scenario() {
        let frame = hand(p(100.0, 100.0), [
            p(100.0, 40.0),
            p(100.0, 150.0),
            p(100.0, 150.0),
            p(100.0, 200.0),
            p(100.0, 200.0),
        ]);
        assert_eq!(classify(Some(&frame)), GestureLabel::ThumbsUp);
    }

    #[test]
    fn fist_only() {
        let frame = hand(p(100.0, 100.0), [
            p(120.0, 110.0),
            p(90.0, 130.0),
            p(100.0, 135.0),
            p(110.0, 130.0),
            p(120.0, 125.0),
        ]);
        let t = Thresholds::default();
        assert_eq!(matching_labels(&frame, &t), vec![GestureLabel::Fist]);
        assert_eq!(classify(Some(&frame)), GestureLabel::Fist);
    }

    #[test]
    fn fist_needs_every_finger() {
        let mut frame = hand(p(100.0, 100.0), [
            p(120.0, 110.0),
            p(90.0, 130.0),
            p(100.0, 135.0),
            p(110.0, 130.0),
            p(120.0, 125.0),
        ])
        .to_annotations();
        frame.pinky.truncate(2);
        let frame = LandmarkFrame::from_annotations(&frame);
        assert_eq!(classify(Some(&frame)), GestureLabel::None);
    }

    #[test]
    fn pinch_requires_open_middle() {
        let palm = p(100.0, 100.0);
        let tips = [
            p(120.0, 130.0),
            p(130.0, 135.0),
            p(100.0, 190.0),
            p(90.0, 200.0),
            p(80.0, 200.0),
        ];
        assert_eq!(classify(Some(&hand(palm, tips))), GestureLabel::Pinch);

        // Middle curled up against the thumb: no longer a pinch.
        let mut closed = tips;
        closed[2] = p(125.0, 140.0);
        assert_eq!(classify(Some(&hand(palm, closed))), GestureLabel::None);
    }

    #[test]
    fn thresholds_are_overridable() {
        let frame = thumb_only(p(100.0, 100.0), p(130.0, 100.0));
        assert_eq!(classify(Some(&frame)), GestureLabel::None);
        let loose = Thresholds { swipe_dx: 20.0, ..Thresholds::default() };
        assert_eq!(classify_with(Some(&frame), &loose), GestureLabel::SwipeRight);
    }

    #[test]
    fn rule_order_is_fixed() {
        let order: Vec<_> = RULES.iter().map(|r| r.label).collect();
        assert_eq!(order, vec![
            GestureLabel::SwipeRight,
            GestureLabel::SwipeLeft,
            GestureLabel::Victory,
            GestureLabel::OpenPalm,
            GestureLabel::Pinch,
            GestureLabel::Fist,
            GestureLabel::ThumbsUp,
        ]);
    }

    #[test]
    fn label_strings() {
        assert_eq!(GestureLabel::ThumbsUp.to_string(), "thumbs-up");
        assert_eq!(GestureLabel::OpenPalm.as_str(), "open-palm");
        assert!(GestureLabel::default().is_none());
    }
}
