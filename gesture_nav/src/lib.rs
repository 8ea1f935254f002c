//! # gesture_nav
//!
//! Hands-free page navigation: per-frame hand landmarks are classified into
//! gestures, debounced by a shared cooldown window, and dispatched to a
//! navigator as history, scroll, zoom and reload actions.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Action |
//! |---|---|
//! | Swipe left (thumb tip well left of the palm) | History back |
//! | Swipe right (thumb tip well right of the palm) | History forward |
//! | Open palm (index and middle raised) | Scroll down |
//! | Pinch (thumb and index tips together) | Zoom in |
//! | Fist (all tips near the palm) | Reset zoom |
//! | Victory (index + middle raised, ring + pinky curled) | Scroll up |
//! | Thumbs up (thumb raised, fingers curled) | Reload |
//!
//! At most one action is dispatched per cooldown window (1000 ms by
//! default), whichever gesture is held.
//!
//! ## Landmark sources
//!
//! * `replay <FILE>` — a JSON-lines recording, run headless.
//! * `window` (default) — **Simulation mode**: keyboard keys pose a hand.
//! * `window` with `leap` — **Hardware mode**: polls a LeapMotion controller
//!   via LeapC.
//!
//! ### Simulation keyboard shortcuts
//!
//! | Key | Pose |
//! |---|---|
//! | `Left` / `Right` | Swipe left / right |
//! | `O` | Open palm |
//! | `P` | Pinch |
//! | `F` | Fist |
//! | `V` | Victory |
//! | `U` | Thumbs up |
//! | `X` | Simulated detector failure |
//! | `N` | Visit the next configured page |
//! | `Space` | Pause / resume detection |
//! | `Q` / `Escape` | Quit |

pub mod error;
pub mod config;
pub mod action;
pub mod gate;
pub mod source;
pub mod session;
pub mod visualizer;
pub mod app;

pub use error::{Error, Result};
