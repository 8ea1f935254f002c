//! Runtime configuration, loaded from TOML.
//!
//! Every field has a default, so a file only needs to name what it changes:
//!
//! ```toml
//! [thresholds]
//! swipe_dx = 80.0        # 1280×720 camera: widen the swipe band
//!
//! [dispatch]
//! cooldown_ms = 750
//!
//! [viewport]
//! pages = ["/", "/settings"]
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use gesture_rules::Thresholds;
use hand_landmarks::Point3;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    pub thresholds: Thresholds,
    pub dispatch:   DispatchConfig,
    pub detection:  DetectionConfig,
    pub viewport:   ViewportConfig,
    pub leap:       LeapConfig,
}

/// Debounce window and the fixed increments of each navigation action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Minimum time between two dispatched actions, of any gesture.
    pub cooldown_ms:    u64,
    /// Pixels scrolled by `ScrollDown` / `ScrollUp`.
    pub scroll_step_px: f32,
    /// Multiplier applied to the zoom level by `ZoomIn`.
    pub zoom_factor:    f32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig {
            cooldown_ms:    1000,
            scroll_step_px: 50.0,
            zoom_factor:    1.1,
        }
    }
}

impl DispatchConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Whether a new session starts with detection switched on.
    pub enabled: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        DetectionConfig { enabled: true }
    }
}

/// Pages the session's history is seeded with, oldest first.  The session
/// opens on the last one, so `HistoryBack` has somewhere to go.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub pages: Vec<String>,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        ViewportConfig {
            pages: vec!["/".to_string(), "/sign-language-mode".to_string()],
        }
    }
}

/// Projection from LeapMotion millimetres (y up) into the pixel space the
/// classifier thresholds were tuned for (y down).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeapConfig {
    /// Pixels per millimetre.
    pub scale:    f32,
    /// Pixel position of the device's x = 0.
    pub origin_x: f32,
    /// Pixel position of the device's y = 0 (the sensor surface).
    pub origin_y: f32,
}

impl Default for LeapConfig {
    fn default() -> Self {
        LeapConfig {
            scale:    2.0,
            origin_x: 320.0,
            origin_y: 700.0,
        }
    }
}

impl LeapConfig {
    pub fn project(&self, x: f32, y: f32, z: f32) -> Point3 {
        Point3::new(
            self.origin_x + x * self.scale,
            self.origin_y - y * self.scale,
            z * self.scale,
        )
    }
}

impl NavConfig {
    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_tuned_constants() {
        let cfg = NavConfig::default();
        assert_eq!(cfg.dispatch.cooldown(), Duration::from_millis(1000));
        assert_eq!(cfg.dispatch.scroll_step_px, 50.0);
        assert_eq!(cfg.thresholds, Thresholds::default());
        assert!(cfg.detection.enabled);
        assert_eq!(cfg.viewport.pages.last().map(String::as_str), Some("/sign-language-mode"));
    }

    #[test]
    fn viewport_pages_override() {
        let cfg = NavConfig::from_toml_str("[viewport]\npages = [\"/\", \"/voice-mode\", \"/settings\"]\n")
            .unwrap();
        assert_eq!(cfg.viewport.pages, vec!["/", "/voice-mode", "/settings"]);
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let cfg = NavConfig::from_toml_str(
            "[thresholds]\nswipe_dx = 80.0\n\n[dispatch]\ncooldown_ms = 250\n",
        )
        .unwrap();
        assert_eq!(cfg.thresholds.swipe_dx, 80.0);
        assert_eq!(cfg.thresholds.fist_radius, 60.0);
        assert_eq!(cfg.dispatch.cooldown_ms, 250);
        assert_eq!(cfg.dispatch.zoom_factor, 1.1);
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(NavConfig::from_toml_str("").unwrap(), NavConfig::default());
    }

    #[test]
    fn bad_toml_is_config_error() {
        let err = NavConfig::from_toml_str("[dispatch]\ncooldown_ms = \"soon\"\n").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[detection]\nenabled = false").unwrap();
        let cfg = NavConfig::load(file.path()).unwrap();
        assert!(!cfg.detection.enabled);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = NavConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }

    #[test]
    fn leap_projection_flips_y() {
        let leap = LeapConfig::default();
        let p = leap.project(10.0, 200.0, -5.0);
        assert_eq!(p, Point3::new(340.0, 300.0, -10.0));
    }
}
