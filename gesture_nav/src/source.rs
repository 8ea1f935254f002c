//! Landmark sources — recorded, simulated, or from LeapMotion hardware.
//!
//! The session pulls [`SourceEvent`]s one at a time through
//! [`LandmarkSource::poll`].  Sources that need their own thread (hardware
//! polling, the keyboard simulator) implement [`ThreadedSource`] and are
//! wrapped by [`spawn_landmark_source`] into a [`ChannelSource`]; consumers
//! don't need to know where frames came from.
//!
//! ## Recording format
//!
//! One JSON object per line, `t_ms` measured from session start:
//!
//! ```text
//! {"t_ms":0,"hands":[{"palmBase":[[320,300,0]],"thumb":[[...],...],...}]}
//! {"t_ms":16,"hands":[]}
//! {"t_ms":33,"error":"inference failed"}
//! ```

use std::io::{BufRead, BufReader, Write};
use std::fs::File;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use gesture_rules::{poses, GestureLabel};
use hand_landmarks::{Digit, HandAnnotations, LandmarkFrame, DIGIT_JOINTS};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

// ════════════════════════════════════════════════════════════════════════════
// SourceEvent
// ════════════════════════════════════════════════════════════════════════════

/// One detection cycle's outcome.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceEvent {
    /// The detector ran.  `frame` is `None` when no hand was found.
    Frame { at: Duration, frame: Option<LandmarkFrame> },
    /// The detector failed this cycle (model not loaded, inference error).
    Unavailable { at: Duration, reason: String },
}

impl SourceEvent {
    pub fn at(&self) -> Duration {
        match self {
            SourceEvent::Frame { at, .. } | SourceEvent::Unavailable { at, .. } => *at,
        }
    }

    /// Build a frame event from the detector's hand list; only the first hand
    /// is used.  Malformed parts are logged and left for the classifier to
    /// skip.
    pub fn from_hands(at: Duration, hands: &[HandAnnotations]) -> Self {
        let frame = hands.first().map(LandmarkFrame::from_annotations);
        if let Some(f) = frame.as_ref().filter(|f| !f.is_complete()) {
            let missing = malformed_parts(f);
            debug!("incomplete hand at {:?}: {}", at, missing.join(", "));
        }
        SourceEvent::Frame { at, frame }
    }
}

/// Annotation keys of the parts a frame lacks: `palmBase` if there is no
/// palm, and every digit with fewer than [`DIGIT_JOINTS`] joints.
pub fn malformed_parts(frame: &LandmarkFrame) -> Vec<&'static str> {
    let palm = frame.palm().is_none().then_some("palmBase");
    let digits = Digit::ALL
        .into_iter()
        .filter(|&d| frame.joints(d).len() < DIGIT_JOINTS)
        .map(Digit::annotation_key);
    palm.into_iter().chain(digits).collect()
}

// ════════════════════════════════════════════════════════════════════════════
// Source traits
// ════════════════════════════════════════════════════════════════════════════

/// Pull interface the driving loop uses.  `None` means the source is done.
pub trait LandmarkSource {
    fn poll(&mut self) -> Option<SourceEvent>;
}

impl<S: LandmarkSource + ?Sized> LandmarkSource for &mut S {
    fn poll(&mut self) -> Option<SourceEvent> {
        (**self).poll()
    }
}

/// A source that produces events on its own thread.
pub trait ThreadedSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>);
}

/// Spawn a threaded source and return the receiving end.
pub fn spawn_landmark_source<S: ThreadedSource>(source: S) -> ChannelSource {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    ChannelSource::new(rx)
}

// ════════════════════════════════════════════════════════════════════════════
// ChannelSource
// ════════════════════════════════════════════════════════════════════════════

pub struct ChannelSource {
    rx: Receiver<SourceEvent>,
}

impl ChannelSource {
    pub fn new(rx: Receiver<SourceEvent>) -> Self {
        ChannelSource { rx }
    }

    /// Everything queued right now, without blocking.  The flag is `false`
    /// once the producing thread has gone away.
    pub fn drain(&self) -> (Vec<SourceEvent>, bool) {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event)                       => out.push(event),
                Err(TryRecvError::Empty)        => return (out, true),
                Err(TryRecvError::Disconnected) => return (out, false),
            }
        }
    }
}

impl LandmarkSource for ChannelSource {
    /// Blocks until the next event or until the producer hangs up.
    fn poll(&mut self) -> Option<SourceEvent> {
        self.rx.recv().ok()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ReplaySource — JSON-lines recordings
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize, Deserialize)]
struct RecordedLine {
    t_ms: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    hands: Vec<HandAnnotations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Plays back a recording.  A line that cannot be parsed is reported as an
/// `Unavailable` event and playback carries on with the next line.
pub struct ReplaySource {
    lines:   std::io::Lines<Box<dyn BufRead>>,
    line_no: usize,
    last_at: Duration,
    done:    bool,
}

impl ReplaySource {
    pub fn new<R: BufRead + 'static>(reader: R) -> Self {
        let reader: Box<dyn BufRead> = Box::new(reader);
        ReplaySource {
            lines:   reader.lines(),
            line_no: 0,
            last_at: Duration::ZERO,
            done:    false,
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }

    fn parse(&mut self, line: &str) -> SourceEvent {
        match serde_json::from_str::<RecordedLine>(line) {
            Ok(rec) => {
                let at = Duration::from_millis(rec.t_ms);
                self.last_at = at;
                match rec.error {
                    Some(reason) => SourceEvent::Unavailable { at, reason },
                    None         => SourceEvent::from_hands(at, &rec.hands),
                }
            }
            Err(e) => {
                warn!("recording line {}: {}", self.line_no, e);
                SourceEvent::Unavailable {
                    at:     self.last_at,
                    reason: format!("line {}: {}", self.line_no, e),
                }
            }
        }
    }
}

impl LandmarkSource for ReplaySource {
    fn poll(&mut self) -> Option<SourceEvent> {
        if self.done {
            return None;
        }
        loop {
            self.line_no += 1;
            match self.lines.next()? {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => return Some(self.parse(&line)),
                Err(e) => {
                    self.done = true;
                    return Some(SourceEvent::Unavailable {
                        at:     self.last_at,
                        reason: format!("read error: {}", e),
                    });
                }
            }
        }
    }
}

/// Writes events in the recording format [`ReplaySource`] reads.
pub struct Recorder<W: Write> {
    out: W,
}

impl<W: Write> Recorder<W> {
    pub fn new(out: W) -> Self {
        Recorder { out }
    }

    pub fn write(&mut self, event: &SourceEvent) -> Result<()> {
        let t_ms = event.at().as_millis() as u64;
        let line = match event {
            SourceEvent::Frame { frame, .. } => RecordedLine {
                t_ms,
                hands: frame.iter().map(LandmarkFrame::to_annotations).collect(),
                error: None,
            },
            SourceEvent::Unavailable { reason, .. } => RecordedLine {
                t_ms,
                hands: Vec::new(),
                error: Some(reason.clone()),
            },
        };
        serde_json::to_writer(&mut self.out, &line)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        Ok(self.out.flush()?)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Passes a failure through once, then stays quiet while the same failure
/// repeats.  Cleared when the source recovers.
#[cfg(any(feature = "leap", test))]
#[derive(Debug, Default)]
struct FailureLatch {
    last: Option<String>,
}

#[cfg(any(feature = "leap", test))]
impl FailureLatch {
    fn report(&mut self, reason: String) -> Option<String> {
        if self.last.as_deref() == Some(reason.as_str()) {
            return None;
        }
        self.last = Some(reason.clone());
        Some(reason)
    }

    fn clear(&mut self) {
        self.last = None;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimSource — keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input from the overlay window's keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimInput {
    /// A gesture key is held: the simulated hand takes that pose.
    Pose(GestureLabel),
    /// No gesture key held: no hand in view.
    NoHand,
    /// Simulate one failed inference.
    Glitch,
    Quit,
}

/// Synthesizes landmark frames from [`SimInput`]s using the canonical poses.
pub struct SimSource {
    rx:    Receiver<SimInput>,
    start:  Instant,
}

impl SimSource {
    pub fn new(rx: Receiver<SimInput>, start: Instant) -> Self {
        SimSource { rx, start }
    }

    fn translate(&self, input: SimInput) -> Option<SourceEvent> {
        let at = self.start.elapsed();
        match input {
            SimInput::Pose(label) => Some(SourceEvent::Frame { at, frame: Some(poses::pose(label)) }),
            SimInput::NoHand      => Some(SourceEvent::Frame { at, frame: None }),
            SimInput::Glitch      => Some(SourceEvent::Unavailable {
                at,
                reason: "simulated inference failure".to_string(),
            }),
            SimInput::Quit        => None,
        }
    }
}

impl ThreadedSource for SimSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        for input in self.rx.iter() {
            let Some(event) = self.translate(input) else { return };
            if tx.send(event).is_err() { return; }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Landmark source backed by a LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Each digit is reported as four joints (knuckle, two interphalangeal
/// joints, tip) and projected into pixel space with [`LeapConfig`].
///
/// [`LeapConfig`]: crate::config::LeapConfig
#[cfg(feature = "leap")]
pub struct LeapSource {
    projection: crate::config::LeapConfig,
    start:      Instant,
}

#[cfg(feature = "leap")]
impl LeapSource {
    pub fn new(projection: crate::config::LeapConfig, start: Instant) -> Self {
        LeapSource { projection, start }
    }
}

#[cfg(feature = "leap")]
impl ThreadedSource for LeapSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        use hand_landmarks::Point3;
        use leaprs::*;

        let unavailable = |reason: String| SourceEvent::Unavailable {
            at: self.start.elapsed(),
            reason,
        };

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => {
                let _ = tx.send(unavailable(format!("LeapC connection: {:?}", e)));
                return;
            }
        };
        if let Err(e) = connection.open() {
            let _ = tx.send(unavailable(format!("LeapMotion device: {:?}", e)));
            return;
        }

        macro_rules! px {
            ($v:expr) => {{
                let v = $v;
                self.projection.project(v.x, v.y, v.z)
            }};
        }

        let mut failures = FailureLatch::default();
        loop {
            let msg = match connection.poll(100) {
                Ok(m) => m,
                Err(leaprs::Error::Timeout) => continue,
                Err(e) => {
                    if let Some(reason) = failures.report(format!("LeapC poll: {:?}", e)) {
                        if tx.send(unavailable(reason)).is_err() {
                            return;
                        }
                    }
                    continue;
                }
            };

            if let Event::Tracking(frame) = msg.event() {
                failures.clear();
                let at = self.start.elapsed();
                let landmark = frame.hands().next().map(|hand| {
                    let palm = px!(hand.palm().position());
                    let mut digits: [Vec<Point3>; 5] = Default::default();
                    for (slot, digit) in hand.digits().enumerate().take(5) {
                        digits[slot] = vec![
                            px!(digit.proximal().prev_joint()),
                            px!(digit.intermediate().prev_joint()),
                            px!(digit.distal().prev_joint()),
                            px!(digit.distal().next_joint()),
                        ];
                    }
                    LandmarkFrame::new(palm, digits)
                });
                if tx.send(SourceEvent::Frame { at, frame: landmark }).is_err() {
                    return;
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
