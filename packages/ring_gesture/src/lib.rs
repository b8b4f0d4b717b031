//! Actions Ring Gesture Recognition
//!
//! Turns raw pointer and scroll events into one of a small set of discrete
//! gestures.
//!
//! # Architecture
//!
//! - [`GestureClassifier`] is a pure state machine. It takes timestamped
//!   [`PointerEvent`]s and owns its own deadlines (long-press and idle reset),
//!   so it can be driven by a real clock or stepped by hand in tests.
//! - [`spawn_gesture_engine`] wraps one classifier in a tokio task that stamps
//!   events with a monotonic clock, sleeps until the next deadline and emits a
//!   [`GestureUpdate`] on every transition.
//!
//! The gesture machine:
//! - `Idle` - nothing happening
//! - `Rotate` - scroll on the ring
//! - `PressDrag` - press, then move past the movement threshold
//! - `LongPress` - press held past the long-press threshold without moving
//! - `DoubleTap` - two short stationary presses inside the double-tap window

mod classifier;
mod engine;
mod gesture;

pub use classifier::{GestureClassifier, PointerSession};
pub use engine::{GestureUpdate, spawn_gesture_engine};
pub use gesture::{
    DEFAULT_DOUBLE_TAP_WINDOW, DEFAULT_IDLE_RESET, DEFAULT_LONG_PRESS, DEFAULT_MOVEMENT_THRESHOLD,
    DEFAULT_ROTATION_PER_UNIT, Gesture, GestureConfig, ParseGestureError, PointerEvent, PointerInput,
};
