//! Top-level drivers: headless replay, the overlay window, and the pose-tour
//! recording generator.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use gesture_rules::{poses, GestureLabel};
use hand_landmarks::LandmarkFrame;
use tracing::{info, warn};

use crate::action::ViewportNavigator;
use crate::config::NavConfig;
use crate::error::{Error, Result};
use crate::session::{run_session, DetectionSession, RunSummary};
use crate::source::{spawn_landmark_source, Recorder, ReplaySource, SimInput, SourceEvent};
use crate::visualizer::{Overlay, Visualizer, WindowInput};

// ════════════════════════════════════════════════════════════════════════════
// run_replay() — headless
// ════════════════════════════════════════════════════════════════════════════

pub struct ReplayReport {
    pub summary:  RunSummary,
    pub viewport: ViewportNavigator,
}

/// Feed a recording through a fresh session.
pub fn run_replay(cfg: &NavConfig, path: &Path) -> Result<ReplayReport> {
    let mut source  = ReplaySource::open(path)?;
    let mut session = DetectionSession::new(cfg, ViewportNavigator::from_config(cfg));
    let stop = AtomicBool::new(false);

    info!("replaying {}", path.display());
    let summary = run_session(&mut source, &mut session, &stop);
    Ok(ReplayReport { summary, viewport: session.into_navigator() })
}

// ════════════════════════════════════════════════════════════════════════════
// write_pose_tour() — demo recordings
// ════════════════════════════════════════════════════════════════════════════

/// Write a recording that holds each gesture's canonical pose for `hold`,
/// with a `gap` of empty frames (no hand) between gestures.  Returns the
/// number of lines written.  `frame_every` must be non-zero.
pub fn write_pose_tour<W: Write>(
    out:         W,
    hold:        Duration,
    gap:         Duration,
    frame_every: Duration,
) -> Result<usize> {
    if frame_every.is_zero() {
        return Err(Error::InvalidArgument("pose tour frame interval must be non-zero".to_string()));
    }
    let mut rec = Recorder::new(out);
    let mut at = Duration::ZERO;
    let mut lines = 0;

    let mut emit = |rec: &mut Recorder<W>, frame: Option<LandmarkFrame>, span: Duration, at: &mut Duration| -> Result<()> {
        let end = *at + span;
        while *at < end {
            rec.write(&SourceEvent::Frame { at: *at, frame: frame.clone() })?;
            lines += 1;
            *at += frame_every;
        }
        Ok(())
    };

    for label in GestureLabel::ALL.into_iter().filter(|l| !l.is_none()) {
        emit(&mut rec, Some(poses::pose(label)), hold, &mut at)?;
        emit(&mut rec, None, gap, &mut at)?;
    }
    rec.flush()?;
    Ok(lines)
}

// ════════════════════════════════════════════════════════════════════════════
// run_window() — the interactive loop
// ════════════════════════════════════════════════════════════════════════════

/// Open the overlay window and run a live session until it is closed.
///
/// Landmarks come from the keyboard simulator, or from LeapMotion hardware
/// with `--features leap`.  With `record` set, every detector event is also
/// written out in replay format.
pub fn run_window(cfg: &NavConfig, record: Option<&Path>) -> Result<RunSummary> {
    let start = Instant::now();
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();

    #[cfg(not(feature = "leap"))]
    let source = spawn_landmark_source(crate::source::SimSource::new(sim_rx, start));
    #[cfg(feature = "leap")]
    let source = {
        drop(sim_rx);
        spawn_landmark_source(crate::source::LeapSource::new(cfg.leap.clone(), start))
    };

    let mut recorder = match record {
        Some(path) => Some(Recorder::new(BufWriter::new(File::create(path)?))),
        None       => None,
    };

    let mut vis = Visualizer::new(sim_tx)?;
    let mut session = DetectionSession::new(cfg, ViewportNavigator::from_config(cfg));
    let mut next_page = 0;
    let mut latest: Option<LandmarkFrame> = None;
    let mut source_alive = true;
    let cooldown = cfg.dispatch.cooldown().as_secs_f32();

    while vis.is_open() {
        // 1. Keyboard → simulated landmarks / session control
        match vis.poll_input() {
            WindowInput::Quit            => break,
            WindowInput::ToggleDetection => session.toggle(),
            WindowInput::VisitNextPage   => {
                if let Some(page) = cfg.viewport.pages.get(next_page) {
                    session.navigator_mut().visit(page);
                    info!("visited {}", page);
                    next_page = (next_page + 1) % cfg.viewport.pages.len();
                }
            }
            WindowInput::Continue        => {}
        }

        // 2. Drain detector events
        let (events, alive) = source.drain();
        for event in events {
            if let Some(rec) = recorder.as_mut() {
                rec.write(&event)?;
            }
            if let SourceEvent::Frame { frame, .. } = &event {
                latest = frame.clone();
            }
            session.handle(event);
        }
        if source_alive && !alive {
            warn!("landmark source stopped");
            source_alive = false;
        }

        // 3. Render
        let now = start.elapsed();
        let cooling = session
            .gate()
            .remaining(now)
            .filter(|_| cooldown > 0.0)
            .map(|left| left.as_secs_f32() / cooldown);
        let status = session.status_message();
        vis.render(&Overlay {
            frame:      latest.as_ref(),
            thresholds: &cfg.thresholds,
            status:     &status,
            cooling,
            viewport:   session.navigator(),
            enabled:    session.is_enabled(),
        })?;
    }

    if let Some(rec) = recorder.as_mut() {
        rec.flush()?;
    }
    Ok(session.summary())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
