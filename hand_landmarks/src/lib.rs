//! # hand_landmarks
//!
//! One hand-landmark detection result, in the pixel space of the source video
//! frame (x grows right, y grows **down**).
//!
//! A detector reports a palm reference point plus five digits, each an ordered
//! list of joints from base to tip.  The classic layout is the 21-point hand
//! model:
//!
//! ```text
//!   index   0     palm base (wrist)
//!   1 ..  4       thumb
//!   5 ..  8       index finger
//!   9 .. 12       middle finger
//!  13 .. 16       ring finger
//!  17 .. 20       pinky
//! ```
//!
//! ## Fingertips
//!
//! The fingertip of a digit is its **last** joint.  A digit with fewer than
//! [`DIGIT_JOINTS`] joints is malformed: [`LandmarkFrame::tip`] returns `None`
//! rather than guessing or indexing out of bounds.
//!
//! ## Quick start
//!
//! ```rust
//! use hand_landmarks::{Digit, HandAnnotations, LandmarkFrame};
//!
//! let raw: HandAnnotations = serde_json::from_str(r#"{
//!     "palmBase":    [[100, 100, 0]],
//!     "thumb":       [[110, 95, 0], [120, 90, 0], [130, 85, 0], [160, 100, 0]]
//! }"#).unwrap();
//!
//! let frame = LandmarkFrame::from_annotations(&raw);
//! assert_eq!(frame.tip(Digit::Thumb).unwrap().x, 160.0);
//! assert!(frame.tip(Digit::Index).is_none()); // missing digit → malformed
//! ```

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// Constants
// ════════════════════════════════════════════════════════════════════════════

/// Joints per digit in the 21-point hand model.  Digits shorter than this are
/// treated as malformed.
pub const DIGIT_JOINTS: usize = 4;


// ════════════════════════════════════════════════════════════════════════════
// Point3
// ════════════════════════════════════════════════════════════════════════════

/// A 3-D landmark position.  Serialized as a bare `[x, y, z]` triple, which is
/// what hand-pose detectors emit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Point3 { x, y, z }
    }

    /// Euclidean distance in 3-D.
    pub fn distance(&self, other: &Point3) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl From<[f32; 3]> for Point3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Point3 { x, y, z }
    }
}

impl From<Point3> for [f32; 3] {
    fn from(p: Point3) -> Self {
        [p.x, p.y, p.z]
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Digit
// ════════════════════════════════════════════════════════════════════════════

/// The five digits of a hand, thumb first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Digit {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Digit {
    pub const ALL: [Digit; 5] = [
        Digit::Thumb,
        Digit::Index,
        Digit::Middle,
        Digit::Ring,
        Digit::Pinky,
    ];

    /// Position of this digit in [`Digit::ALL`] and in [`LandmarkFrame`]'s
    /// digit table.
    pub const fn slot(self) -> usize {
        match self {
            Digit::Thumb  => 0,
            Digit::Index  => 1,
            Digit::Middle => 2,
            Digit::Ring   => 3,
            Digit::Pinky  => 4,
        }
    }

    /// The key the detector uses for this digit in its annotation record.
    pub const fn annotation_key(self) -> &'static str {
        match self {
            Digit::Thumb  => "thumb",
            Digit::Index  => "indexFinger",
            Digit::Middle => "middleFinger",
            Digit::Ring   => "ringFinger",
            Digit::Pinky  => "pinky",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandAnnotations — the raw detector record
// ════════════════════════════════════════════════════════════════════════════

/// One hand as reported by the landmark detector, keyed by part name.
///
/// Every field defaults to empty, so a record with missing parts still
/// deserializes; the gaps surface later as malformed digits.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HandAnnotations {
    pub palm_base:     Vec<Point3>,
    pub thumb:         Vec<Point3>,
    pub index_finger:  Vec<Point3>,
    pub middle_finger: Vec<Point3>,
    pub ring_finger:   Vec<Point3>,
    pub pinky:         Vec<Point3>,
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkFrame
// ════════════════════════════════════════════════════════════════════════════

/// A single instant's landmarks for one hand.  Immutable once built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LandmarkFrame {
    palm:   Option<Point3>,
    digits: [Vec<Point3>; 5],
}

impl LandmarkFrame {
    /// Build a frame from a palm point and the five digits in [`Digit::ALL`]
    /// order.
    pub fn new(palm: Point3, digits: [Vec<Point3>; 5]) -> Self {
        LandmarkFrame { palm: Some(palm), digits }
    }

    /// Build a frame from the detector's annotation record.  The palm is the
    /// first `palmBase` point; an empty `palmBase` leaves the palm unset.
    pub fn from_annotations(raw: &HandAnnotations) -> Self {
        LandmarkFrame {
            palm: raw.palm_base.first().copied(),
            digits: [
                raw.thumb.clone(),
                raw.index_finger.clone(),
                raw.middle_finger.clone(),
                raw.ring_finger.clone(),
                raw.pinky.clone(),
            ],
        }
    }

    /// The palm reference point, if the detector supplied one.
    pub fn palm(&self) -> Option<Point3> {
        self.palm
    }

    /// All joints of a digit, base first.
    pub fn joints(&self, digit: Digit) -> &[Point3] {
        &self.digits[digit.slot()]
    }

    /// The fingertip: last joint of the digit, or `None` when the digit has
    /// fewer than [`DIGIT_JOINTS`] joints.
    pub fn tip(&self, digit: Digit) -> Option<Point3> {
        let joints = self.joints(digit);
        if joints.len() < DIGIT_JOINTS {
            return None;
        }
        joints.last().copied()
    }

    /// True when the palm and every digit are present and well-formed.
    pub fn is_complete(&self) -> bool {
        self.palm.is_some() && Digit::ALL.iter().all(|&d| self.tip(d).is_some())
    }

    /// Convert back to the detector's annotation record.
    pub fn to_annotations(&self) -> HandAnnotations {
        HandAnnotations {
            palm_base:     self.palm.into_iter().collect(),
            thumb:         self.joints(Digit::Thumb).to_vec(),
            index_finger:  self.joints(Digit::Index).to_vec(),
            middle_finger: self.joints(Digit::Middle).to_vec(),
            ring_finger:   self.joints(Digit::Ring).to_vec(),
            pinky:         self.joints(Digit::Pinky).to_vec(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
