//! Canonical hand poses, one per [`GestureLabel`].
//!
//! Used by the keyboard simulator to synthesize frames and by tests as
//! known-good inputs.  Poses are centred on [`PALM`] in a 640×480 frame.

use hand_landmarks::{LandmarkFrame, Point3, DIGIT_JOINTS};

use crate::GestureLabel;

/// Palm position every canonical pose is built around.
pub const PALM: Point3 = Point3::new(320.0, 300.0, 0.0);

/// Build a well-formed frame from a palm and five fingertips (thumb first).
/// Intermediate joints are spaced evenly along the palm→tip segment.
pub fn hand(palm: Point3, tips: [Point3; 5]) -> LandmarkFrame {
    let digits = tips.map(|tip| {
        (1..=DIGIT_JOINTS)
            .map(|i| {
                let f = i as f32 / DIGIT_JOINTS as f32;
                Point3::new(
                    palm.x + (tip.x - palm.x) * f,
                    palm.y + (tip.y - palm.y) * f,
                    palm.z + (tip.z - palm.z) * f,
                )
            })
            .collect()
    });
    LandmarkFrame::new(palm, digits)
}

/// Fingertip offsets from [`PALM`] for each gesture.
fn tip_offsets(label: GestureLabel) -> [(f32, f32); 5] {
    match label {
        GestureLabel::SwipeRight => [( 80.0,   0.0), (-10.0, -100.0), ( 10.0, -110.0), ( 25.0, -100.0), ( 40.0, -80.0)],
        GestureLabel::SwipeLeft  => [(-80.0,   0.0), (-10.0, -100.0), ( 10.0, -110.0), ( 25.0, -100.0), ( 40.0, -80.0)],
        GestureLabel::Victory    => [( 20.0,  20.0), (-20.0, -100.0), ( 20.0, -100.0), ( 10.0,   60.0), ( 25.0,  50.0)],
        GestureLabel::OpenPalm   => [( 40.0, -20.0), (-10.0, -120.0), ( 10.0, -130.0), ( 30.0, -110.0), ( 50.0, -90.0)],
        GestureLabel::Pinch      => [( 15.0,  30.0), ( 25.0,   35.0), (  0.0,   80.0), (-10.0,   90.0), (-20.0,  90.0)],
        GestureLabel::Fist       => [( 25.0, -10.0), (-10.0,   30.0), (  0.0,   35.0), ( 10.0,   35.0), ( 20.0,  30.0)],
        GestureLabel::ThumbsUp   => [(  0.0, -70.0), ( 40.0,   80.0), ( 45.0,   90.0), ( 50.0,   95.0), ( 52.0, 100.0)],
        GestureLabel::None       => [( 10.0,   0.0), ( 80.0,    0.0), ( 90.0,    0.0), (100.0,    0.0), (110.0,   0.0)],
    }
}

/// A frame that classifies as `label` under the default thresholds.
pub fn pose(label: GestureLabel) -> LandmarkFrame {
    pose_at(label, PALM)
}

/// [`pose`] translated so the palm sits at `palm`.
fn pose_at(label: GestureLabel, palm: Point3) -> LandmarkFrame {
    let tips = tip_offsets(label).map(|(dx, dy)| Point3::new(palm.x + dx, palm.y + dy, palm.z));
    hand(palm, tips)
}
