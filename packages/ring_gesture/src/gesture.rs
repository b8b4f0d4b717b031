//! Gesture Types
//!
//! Defines the gesture vocabulary, the pointer events that feed the
//! classifier and the thresholds it runs with.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Distance (in pointer units) a press must travel before it becomes a drag
pub const DEFAULT_MOVEMENT_THRESHOLD: f64 = 10.0;
/// How long a stationary press must be held to become a long-press
pub const DEFAULT_LONG_PRESS: Duration = Duration::from_millis(800);
/// Maximum gap between two tap releases for them to form a double-tap
pub const DEFAULT_DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(300);
/// Quiet period after a gesture before the ring falls back to idle
pub const DEFAULT_IDLE_RESET: Duration = Duration::from_millis(1500);
/// Degrees of ring rotation per scroll unit
pub const DEFAULT_ROTATION_PER_UNIT: f64 = 0.5;

/// The gesture currently recognized on the ring
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Gesture {
    /// No gesture in progress
    #[default]
    Idle,

    /// Scroll on the ring
    Rotate,

    /// Press and move past the movement threshold
    PressDrag,

    /// Press held without moving
    LongPress,

    /// Two quick taps
    DoubleTap,
}

impl Gesture {
    pub const ALL: [Gesture; 5] = [
        Gesture::Idle,
        Gesture::Rotate,
        Gesture::PressDrag,
        Gesture::LongPress,
        Gesture::DoubleTap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gesture::Idle => "idle",
            Gesture::Rotate => "rotate",
            Gesture::PressDrag => "press-drag",
            Gesture::LongPress => "long-press",
            Gesture::DoubleTap => "double-tap",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown gesture: {0}")]
pub struct ParseGestureError(pub String);

impl FromStr for Gesture {
    type Err = ParseGestureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gesture::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| ParseGestureError(s.to_string()))
    }
}

/// A pointer or scroll event stamped with the time it happened.
///
/// Timestamps are offsets from an origin chosen by whoever drives the
/// classifier. They only need to be monotonic.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    PressStart { x: f64, y: f64, at: Duration },
    PressMove { x: f64, y: f64, at: Duration },
    PressEnd { at: Duration },
    Scroll { delta_y: f64, at: Duration },
}

impl PointerEvent {
    pub fn at(&self) -> Duration {
        match *self {
            PointerEvent::PressStart { at, .. }
            | PointerEvent::PressMove { at, .. }
            | PointerEvent::PressEnd { at }
            | PointerEvent::Scroll { at, .. } => at,
        }
    }
}

/// A pointer or scroll event before it has been stamped by a clock
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerInput {
    PressStart { x: f64, y: f64 },
    PressMove { x: f64, y: f64 },
    PressEnd,
    Scroll { delta_y: f64 },
}

impl PointerInput {
    pub fn at(self, at: Duration) -> PointerEvent {
        match self {
            PointerInput::PressStart { x, y } => PointerEvent::PressStart { x, y, at },
            PointerInput::PressMove { x, y } => PointerEvent::PressMove { x, y, at },
            PointerInput::PressEnd => PointerEvent::PressEnd { at },
            PointerInput::Scroll { delta_y } => PointerEvent::Scroll { delta_y, at },
        }
    }
}

/// Thresholds the classifier runs with
#[derive(Clone, Debug, PartialEq)]
pub struct GestureConfig {
    /// Movement (euclidean distance from the press origin) that must be
    /// exceeded for a press to become a drag
    pub movement_threshold: f64,
    pub long_press: Duration,
    pub double_tap_window: Duration,
    pub idle_reset: Duration,
    pub rotation_per_unit: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            movement_threshold: DEFAULT_MOVEMENT_THRESHOLD,
            long_press: DEFAULT_LONG_PRESS,
            double_tap_window: DEFAULT_DOUBLE_TAP_WINDOW,
            idle_reset: DEFAULT_IDLE_RESET,
            rotation_per_unit: DEFAULT_ROTATION_PER_UNIT,
        }
    }
}
