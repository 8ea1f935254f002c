//! Software-rendered landmark overlay using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  camera space 640×480                        │
//! │    ┆swipe band┆                              │
//! │ ───┼──── palm line ────┼──                   │
//! │    ┆  ◇ joints, bones  ┆   ○ fist radius      │
//! ├──────────────────────────────────────────────┤
//! │  status message            [cooldown bar]    │
//! │  viewport summary                            │
//! │  rules matching this frame                   │
//! │  key legend                                  │
//! └──────────────────────────────────────────────┘
//! ```

use std::sync::mpsc::Sender;

use gesture_rules::{matching_labels, GestureLabel, Thresholds};
use hand_landmarks::{Digit, LandmarkFrame, Point3};
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::action::ViewportNavigator;
use crate::error::{Error, Result};
use crate::source::SimInput;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:     usize = 640;
pub const VIDEO_H:   usize = 480;
pub const WIN_H:     usize = VIDEO_H + 72;
const STATUS_Y:      usize = VIDEO_H;
const BG_COLOR:      u32   = 0xFF101820;
const GRID_COLOR:    u32   = 0xFF1C2A36;
const GUIDE_COLOR:   u32   = 0xFF3A5068;
const STATUS_BG:     u32   = 0xFF0F3460;
const PAUSED_TINT:   u32   = 0xFF505050;
const COOL_COLOR:    u32   = 0xFFFFD700;

/// Bone / joint colour per digit, thumb first.
const DIGIT_COLORS: [u32; 5] = [0xFFFF6B6B, 0xFFFFD93D, 0xFF6BCB77, 0xFF4D96FF, 0xFFC77DFF];

/// Keys that pose the simulated hand while held.
const POSE_KEYS: [(Key, GestureLabel); 7] = [
    (Key::Left,  GestureLabel::SwipeLeft),
    (Key::Right, GestureLabel::SwipeRight),
    (Key::O,     GestureLabel::OpenPalm),
    (Key::P,     GestureLabel::Pinch),
    (Key::F,     GestureLabel::Fist),
    (Key::V,     GestureLabel::Victory),
    (Key::U,     GestureLabel::ThumbsUp),
];

/// What the window asks the driving loop to do after input polling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowInput {
    Continue,
    ToggleDetection,
    VisitNextPage,
    Quit,
}

/// Everything one rendered frame shows.
pub struct Overlay<'a> {
    pub frame:      Option<&'a LandmarkFrame>,
    pub thresholds: &'a Thresholds,
    pub status:     &'a str,
    /// Fraction of the cooldown window still to run, if cooling.
    pub cooling:    Option<f32>,
    pub viewport:   &'a ViewportNavigator,
    pub enabled:    bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf:    Vec<u32>,
    sim_tx: Sender<SimInput>,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>) -> Result<Self> {
        let mut window = Window::new(
            "Gesture Navigation — landmark overlay",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| Error::Window(e.to_string()))?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll the keyboard.  Held gesture keys become one simulated frame per
    /// call, like a camera delivering a frame per display refresh.
    pub fn poll_input(&mut self) -> WindowInput {
        if !self.window.is_open() {
            return WindowInput::Quit;
        }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if one_shot(Key::Q) || one_shot(Key::Escape) {
            let _ = self.sim_tx.send(SimInput::Quit);
            return WindowInput::Quit;
        }
        if one_shot(Key::X) {
            let _ = self.sim_tx.send(SimInput::Glitch);
        }
        let toggle = one_shot(Key::Space);
        let visit  = one_shot(Key::N);

        let held = POSE_KEYS
            .iter()
            .find(|(k, _)| self.window.is_key_down(*k))
            .map(|&(_, label)| label);
        let _ = self.sim_tx.send(match held {
            Some(label) => SimInput::Pose(label),
            None        => SimInput::NoHand,
        });

        match (toggle, visit) {
            (true, _)      => WindowInput::ToggleDetection,
            (false, true)  => WindowInput::VisitNextPage,
            (false, false) => WindowInput::Continue,
        }
    }

    /// Render one frame.
    pub fn render(&mut self, overlay: &Overlay<'_>) -> Result<()> {
        self.buf.fill(BG_COLOR);

        // ── Camera-space grid ─────────────────────────────────────────────
        for x in (0..WIN_W).step_by(80) {
            self.vline(x, 0, VIDEO_H, GRID_COLOR);
        }
        for y in (0..VIDEO_H).step_by(80) {
            self.hline(0, WIN_W, y, GRID_COLOR);
        }

        // ── Hand ──────────────────────────────────────────────────────────
        if let Some(frame) = overlay.frame {
            if let Some(palm) = frame.palm() {
                self.draw_guides(palm, overlay.thresholds);
            }
            self.draw_hand(frame, overlay.enabled);
        }

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, STATUS_Y, WIN_W, WIN_H - STATUS_Y, STATUS_BG);
        let text_color = if overlay.enabled { 0xFFEEEEEE } else { 0xFF999999 };
        self.draw_text(overlay.status, 10, STATUS_Y + 8, 2, text_color);

        if let Some(left) = overlay.cooling {
            let w = (160.0 * left.clamp(0.0, 1.0)) as usize;
            self.draw_border(WIN_W - 172, STATUS_Y + 6, 162, 14, COOL_COLOR);
            self.fill_rect(WIN_W - 171, STATUS_Y + 7, w, 12, COOL_COLOR);
        }

        self.draw_text(&overlay.viewport.summary(), 10, STATUS_Y + 30, 1, 0xFFAADDFF);
        self.draw_text(&rule_readout(overlay.frame, overlay.thresholds), 10, STATUS_Y + 42, 1, 0xFF88CC88);

        // ── Key legend ────────────────────────────────────────────────────
        self.draw_text(
            "left/right=swipe  o=palm  p=pinch  f=fist  v=victory  u=thumbs up  x=glitch  n=next page  space=pause  q=quit",
            10, WIN_H - 14, 1, 0xFF888888,
        );

        self.window
            .update_with_buffer(&self.buf, WIN_W, WIN_H)
            .map_err(|e| Error::Window(e.to_string()))
    }

    // ── Hand drawing ──────────────────────────────────────────────────────

    /// Swipe band, palm line and fist radius around the palm.
    fn draw_guides(&mut self, palm: Point3, t: &Thresholds) {
        let (px, py) = to_px(palm);
        let dx = t.swipe_dx as isize;
        for x in [px - dx, px + dx] {
            if x >= 0 { self.vline(x as usize, 0, VIDEO_H, GUIDE_COLOR); }
        }
        if py >= 0 { self.hline(0, WIN_W, py as usize, GUIDE_COLOR); }
        self.draw_circle(px, py, t.fist_radius as isize, GUIDE_COLOR);
    }

    fn draw_hand(&mut self, frame: &LandmarkFrame, enabled: bool) {
        let palm = frame.palm().map(to_px);
        for digit in Digit::ALL {
            let color = if enabled { DIGIT_COLORS[digit.slot()] } else { PAUSED_TINT };
            let mut prev = palm;
            for joint in frame.joints(digit).iter().copied().map(to_px) {
                if let Some(from) = prev {
                    self.draw_line(from, joint, color);
                }
                self.draw_diamond(joint.0, joint.1, 2, color);
                prev = Some(joint);
            }
            if let Some(tip) = frame.tip(digit).map(to_px) {
                self.draw_diamond(tip.0, tip.1, 4, color);
            }
        }
        if let Some((x, y)) = palm {
            self.draw_diamond(x, y, 5, 0xFFFFFFFF);
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(WIN_H) {
            for col in x..(x + w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        self.hline(x, x + w, y, color);
        self.hline(x, x + w, y + h - 1, color);
        self.vline(x, y, y + h, color);
        self.vline(x + w - 1, y, y + h, color);
    }

    fn hline(&mut self, x0: usize, x1: usize, y: usize, color: u32) {
        for x in x0..x1 {
            self.set_pixel(x as isize, y as isize, color);
        }
    }

    fn vline(&mut self, x: usize, y0: usize, y1: usize, color: u32) {
        for y in y0..y1 {
            self.set_pixel(x as isize, y as isize, color);
        }
    }

    fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < WIN_W && (y as usize) < WIN_H {
            self.buf[y as usize * WIN_W + x as usize] = color;
        }
    }

    /// Bresenham line.
    fn draw_line(&mut self, (x0, y0): (isize, isize), (x1, y1): (isize, isize), color: u32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);
        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    /// Midpoint circle outline.
    fn draw_circle(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        let (mut x, mut y, mut d) = (r, 0isize, 1 - r);
        while x >= y {
            for (sx, sy) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
                self.set_pixel(cx + sx, cy + sy, color);
            }
            y += 1;
            if d < 0 {
                d += 2 * y + 1;
            } else {
                x -= 1;
                d += 2 * (y - x) + 1;
            }
        }
    }

    fn draw_diamond(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        for dy in -r..=r {
            let span = r - dy.abs();
            for dx in -span..=span {
                self.set_pixel(cx + dx, cy + dy, color);
            }
        }
    }

    /// 3×5 bitmap font, each glyph pixel drawn as a `scale`×`scale` block.
    fn draw_text(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            if cx + 4 * scale > WIN_W { break; }
            for (row, &bits) in char_glyph(ch).iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale;
        }
    }
}

/// Every rule the frame satisfies, highest precedence first.  The first one
/// is what the classifier reports.
fn rule_readout(frame: Option<&LandmarkFrame>, t: &Thresholds) -> String {
    let labels = frame.map(|f| matching_labels(f, t)).unwrap_or_default();
    if labels.is_empty() {
        return "rules: -".to_string();
    }
    let names: Vec<&str> = labels.iter().map(GestureLabel::as_str).collect();
    format!("rules: {}", names.join(" "))
}

/// Landmark → pixel coordinates (z is ignored).
fn to_px(p: Point3) -> (isize, isize) {
    (p.x.round() as isize, p.y.round() as isize)
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c.to_ascii_lowercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_px_rounds() {
        assert_eq!(to_px(Point3::new(10.4, 20.6, 99.0)), (10, 21));
    }

    #[test]
    fn rule_readout_lists_overlapping_rules() {
        let t = Thresholds::default();
        let victory = gesture_rules::poses::pose(GestureLabel::Victory);
        let text = rule_readout(Some(&victory), &t);
        assert!(text.starts_with("rules: victory"), "{}", text);
        assert!(text.contains("open-palm"), "{}", text);
        assert_eq!(rule_readout(None, &t), "rules: -");
    }

    #[test]
    fn legend_characters_have_glyphs() {
        let fallback = char_glyph('\u{1}');
        for ch in "leftrightopalmpinchfistvictoryuthumbsxglitchnextpagespacepauseq=/-".chars() {
            assert_ne!(char_glyph(ch), fallback, "missing glyph for {:?}", ch);
        }
    }
}
