//! Gesture Classifier
//!
//! Pure state machine that turns timestamped pointer events into gestures.
//!
//! ## Timers
//!
//! The classifier owns two deadlines instead of real timers:
//!
//! - **long-press**: armed on press start, cancelled by release or by movement
//!   past the threshold. Firing sets `LongPress`.
//! - **idle reset**: a debounce armed by rotate, double-tap and the release
//!   of a drag or long-press. Re-arming replaces the previous deadline.
//!   Firing sets `Idle`.
//!
//! Before an event at time `t` is applied, every deadline due before `t`
//! fires in deadline order. A deadline equal to `t` also fires first, except
//! the long-press deadline against a `PressMove`: movement wins the tie.

use std::time::Duration;

use tracing::debug;

use crate::gesture::{Gesture, GestureConfig, PointerEvent};

/// An in-progress press
#[derive(Clone, Debug, PartialEq)]
pub struct PointerSession {
    pub started_at: Duration,
    pub start_x: f64,
    pub start_y: f64,
    /// True once the pointer travelled past the movement threshold
    pub moved: bool,
    /// `PressDrag` or `LongPress` once this press produced one
    pub outcome: Option<Gesture>,
}

impl PointerSession {
    fn new(x: f64, y: f64, at: Duration) -> Self {
        Self {
            started_at: at,
            start_x: x,
            start_y: y,
            moved: false,
            outcome: None,
        }
    }

    fn distance_to(&self, x: f64, y: f64) -> f64 {
        (x - self.start_x).hypot(y - self.start_y)
    }
}

pub struct GestureClassifier {
    config: GestureConfig,
    current: Gesture,
    session: Option<PointerSession>,
    /// Release time of the last tap still waiting for a partner
    last_tap_at: Option<Duration>,
    rotation: f64,
    long_press_at: Option<Duration>,
    idle_at: Option<Duration>,
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl GestureClassifier {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            current: Gesture::Idle,
            session: None,
            last_tap_at: None,
            rotation: 0.0,
            long_press_at: None,
            idle_at: None,
        }
    }

    pub fn current(&self) -> Gesture {
        self.current
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Accumulated ring rotation in degrees (cosmetic)
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn session(&self) -> Option<&PointerSession> {
        self.session.as_ref()
    }

    pub fn last_tap_at(&self) -> Option<Duration> {
        self.last_tap_at
    }

    pub fn long_press_deadline(&self) -> Option<Duration> {
        self.long_press_at
    }

    pub fn idle_deadline(&self) -> Option<Duration> {
        self.idle_at
    }

    /// Earliest pending deadline, if any
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.long_press_at, self.idle_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Apply one event. Returns every gesture the classifier moved to, in
    /// order, including transitions from deadlines that came due first.
    pub fn handle(&mut self, event: PointerEvent) -> Vec<Gesture> {
        let mut changes = Vec::new();
        let at = event.at();
        let long_press_wins_tie = !matches!(event, PointerEvent::PressMove { .. });
        self.fire_due(at, long_press_wins_tie, &mut changes);

        match event {
            PointerEvent::PressStart { x, y, at } => self.press_start(x, y, at),
            PointerEvent::PressMove { x, y, .. } => self.press_move(x, y, &mut changes),
            PointerEvent::PressEnd { at } => self.press_end(at, &mut changes),
            PointerEvent::Scroll { delta_y, at } => self.scroll(delta_y, at, &mut changes),
        }

        changes
    }

    /// Fire every deadline at or before `now`
    pub fn advance(&mut self, now: Duration) -> Vec<Gesture> {
        let mut changes = Vec::new();
        self.fire_due(now, true, &mut changes);
        changes
    }

    fn fire_due(&mut self, now: Duration, long_press_inclusive: bool, changes: &mut Vec<Gesture>) {
        loop {
            let long_press = self
                .long_press_at
                .filter(|&d| d < now || (long_press_inclusive && d == now));
            let idle = self.idle_at.filter(|&d| d <= now);

            match (long_press, idle) {
                (Some(lp), Some(idle)) if lp <= idle => self.fire_long_press(changes),
                (_, Some(_)) => self.fire_idle(changes),
                (Some(_), None) => self.fire_long_press(changes),
                (None, None) => break,
            }
        }
    }

    fn fire_long_press(&mut self, changes: &mut Vec<Gesture>) {
        self.long_press_at = None;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.moved || session.outcome.is_some() {
            return;
        }
        session.outcome = Some(Gesture::LongPress);
        // Held presses stay alive until release
        self.idle_at = None;
        self.set(Gesture::LongPress, changes);
    }

    fn fire_idle(&mut self, changes: &mut Vec<Gesture>) {
        self.idle_at = None;
        self.set(Gesture::Idle, changes);
    }

    fn press_start(&mut self, x: f64, y: f64, at: Duration) {
        if self.session.is_some() {
            debug!("Press started while another was active, discarding the stale press");
        }
        self.session = Some(PointerSession::new(x, y, at));
        self.long_press_at = Some(at + self.config.long_press);
    }

    fn press_move(&mut self, x: f64, y: f64, changes: &mut Vec<Gesture>) {
        let threshold = self.config.movement_threshold;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.moved || session.outcome.is_some() {
            return;
        }
        if session.distance_to(x, y) <= threshold {
            return;
        }

        session.moved = true;
        session.outcome = Some(Gesture::PressDrag);
        self.long_press_at = None;
        self.idle_at = None;
        self.set(Gesture::PressDrag, changes);
    }

    fn press_end(&mut self, at: Duration, changes: &mut Vec<Gesture>) {
        let Some(session) = self.session.take() else {
            return;
        };
        self.long_press_at = None;

        let duration = at.saturating_sub(session.started_at);
        if session.moved || duration >= self.config.long_press {
            if session.outcome.is_some() {
                self.arm_idle(at);
            }
            return;
        }

        let window = self.config.double_tap_window;
        if self
            .last_tap_at
            .is_some_and(|last| at.saturating_sub(last) < window)
        {
            self.last_tap_at = None;
            self.set(Gesture::DoubleTap, changes);
            self.arm_idle(at);
        } else {
            self.last_tap_at = Some(at);
        }
    }

    fn scroll(&mut self, delta_y: f64, at: Duration, changes: &mut Vec<Gesture>) {
        self.rotation += delta_y * self.config.rotation_per_unit;
        self.set(Gesture::Rotate, changes);
        self.arm_idle(at);
    }

    fn arm_idle(&mut self, at: Duration) {
        self.idle_at = Some(at + self.config.idle_reset);
    }

    fn set(&mut self, gesture: Gesture, changes: &mut Vec<Gesture>) {
        if self.current != gesture {
            debug!("Gesture changed: {} -> {}", self.current, gesture);
            self.current = gesture;
            changes.push(gesture);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn start(x: f64, y: f64, t: u64) -> PointerEvent {
        PointerEvent::PressStart { x, y, at: ms(t) }
    }

    fn mv(x: f64, y: f64, t: u64) -> PointerEvent {
        PointerEvent::PressMove { x, y, at: ms(t) }
    }

    fn end(t: u64) -> PointerEvent {
        PointerEvent::PressEnd { at: ms(t) }
    }

    fn scroll(delta_y: f64, t: u64) -> PointerEvent {
        PointerEvent::Scroll { delta_y, at: ms(t) }
    }

    #[test]
    fn test_initial_state_is_idle() {
        let classifier = GestureClassifier::default();
        assert_eq!(classifier.current(), Gesture::Idle);
        assert!(classifier.session().is_none());
        assert!(classifier.next_deadline().is_none());
    }

    #[test]
    fn test_single_tap_records_release_without_change() {
        let mut c = GestureClassifier::default();
        assert!(c.handle(start(0.0, 0.0, 0)).is_empty());
        assert!(c.handle(end(200)).is_empty());
        assert_eq!(c.current(), Gesture::Idle);
        assert_eq!(c.last_tap_at(), Some(ms(200)));
        assert!(c.session().is_none());
    }

    #[test]
    fn test_double_tap_scenario() {
        let mut c = GestureClassifier::default();
        c.handle(start(0.0, 0.0, 0));
        c.handle(end(200));
        c.handle(start(0.0, 0.0, 350));
        let changes = c.handle(end(400));

        assert_eq!(changes, vec![Gesture::DoubleTap]);
        assert_eq!(c.last_tap_at(), None);
        assert_eq!(c.idle_deadline(), Some(ms(1900)));
    }

    #[test]
    fn test_tap_gap_at_window_is_not_double_tap() {
        let mut c = GestureClassifier::default();
        c.handle(start(0.0, 0.0, 0));
        c.handle(end(100));
        c.handle(start(0.0, 0.0, 300));
        let changes = c.handle(end(400));

        assert!(changes.is_empty());
        assert_eq!(c.last_tap_at(), Some(ms(400)));
    }

    #[test]
    fn test_third_tap_after_double_tap_is_fresh_single_tap() {
        let mut c = GestureClassifier::default();
        c.handle(start(0.0, 0.0, 0));
        c.handle(end(50));
        c.handle(start(0.0, 0.0, 100));
        assert_eq!(c.handle(end(150)), vec![Gesture::DoubleTap]);

        c.handle(start(0.0, 0.0, 200));
        assert!(c.handle(end(250)).is_empty());
        assert_eq!(c.current(), Gesture::DoubleTap);
        assert_eq!(c.last_tap_at(), Some(ms(250)));
        // The idle countdown still belongs to the double-tap
        assert_eq!(c.idle_deadline(), Some(ms(1650)));
    }

    #[test]
    fn test_press_drag_scenario() {
        let mut c = GestureClassifier::default();
        c.handle(start(0.0, 0.0, 0));
        assert_eq!(c.handle(mv(15.0, 0.0, 50)), vec![Gesture::PressDrag]);
        assert!(c.long_press_deadline().is_none());

        assert!(c.handle(end(100)).is_empty());
        assert_eq!(c.idle_deadline(), Some(ms(1600)));

        assert!(c.advance(ms(1599)).is_empty());
        assert_eq!(c.current(), Gesture::PressDrag);
        assert_eq!(c.advance(ms(1600)), vec![Gesture::Idle]);
    }

    #[test]
    fn test_movement_at_threshold_is_ignored() {
        let mut c = GestureClassifier::default();
        c.handle(start(0.0, 0.0, 0));
        assert!(c.handle(mv(6.0, 8.0, 10)).is_empty());
        assert!(!c.session().unwrap().moved);
        assert_eq!(c.long_press_deadline(), Some(ms(800)));
    }

    #[test]
    fn test_drag_is_measured_from_press_origin() {
        let mut c = GestureClassifier::default();
        c.handle(start(100.0, 100.0, 0));
        assert!(c.handle(mv(105.0, 105.0, 10)).is_empty());
        assert_eq!(c.handle(mv(92.0, 108.0, 20)), vec![Gesture::PressDrag]);
    }

    #[test]
    fn test_drag_does_not_arm_idle_while_held() {
        let mut c = GestureClassifier::default();
        c.handle(start(0.0, 0.0, 0));
        c.handle(mv(20.0, 0.0, 10));
        assert!(c.idle_deadline().is_none());
        assert!(c.advance(ms(10_000)).is_empty());
        assert_eq!(c.current(), Gesture::PressDrag);
    }

    #[test]
    fn test_long_press_fires_at_threshold() {
        let mut c = GestureClassifier::default();
        c.handle(start(0.0, 0.0, 0));
        assert!(c.advance(ms(799)).is_empty());
        assert_eq!(c.advance(ms(800)), vec![Gesture::LongPress]);
        assert!(c.long_press_deadline().is_none());
        assert!(c.idle_deadline().is_none());
    }

    #[test]
    fn test_move_after_long_press_does_not_revert() {
        let mut c = GestureClassifier::default();
        c.handle(start(0.0, 0.0, 0));
        c.advance(ms(900));
        assert!(c.handle(mv(50.0, 50.0, 950)).is_empty());
        assert_eq!(c.current(), Gesture::LongPress);

        assert!(c.handle(end(1000)).is_empty());
        assert_eq!(c.idle_deadline(), Some(ms(2500)));
        assert_eq!(c.advance(ms(2500)), vec![Gesture::Idle]);
    }

    #[test]
    fn test_late_move_fires_overdue_long_press_first() {
        // No advance() between press and move: the overdue deadline fires
        // before the move is applied, so the move is ignored.
        let mut c = GestureClassifier::default();
        c.handle(start(0.0, 0.0, 0));
        assert_eq!(c.handle(mv(30.0, 0.0, 801)), vec![Gesture::LongPress]);
        assert_eq!(c.current(), Gesture::LongPress);
    }

    #[test]
    fn test_move_wins_tie_with_long_press() {
        let mut c = GestureClassifier::default();
        c.handle(start(0.0, 0.0, 0));
        assert_eq!(c.handle(mv(30.0, 0.0, 800)), vec![Gesture::PressDrag]);
        assert!(c.advance(ms(5000)).is_empty());
        assert_eq!(c.current(), Gesture::PressDrag);
    }

    #[test]
    fn test_release_at_threshold_completes_long_press() {
        let mut c = GestureClassifier::default();
        c.handle(start(0.0, 0.0, 0));
        assert_eq!(c.handle(end(800)), vec![Gesture::LongPress]);
        assert_eq!(c.idle_deadline(), Some(ms(2300)));
        assert_eq!(c.last_tap_at(), None);
    }

    #[test]
    fn test_release_before_threshold_cancels_long_press() {
        let mut c = GestureClassifier::default();
        c.handle(start(0.0, 0.0, 0));
        c.handle(end(799));
        assert!(c.long_press_deadline().is_none());
        assert!(c.advance(ms(5000)).is_empty());
        assert_eq!(c.current(), Gesture::Idle);
    }

    #[test]
    fn test_scroll_rotates_and_accumulates() {
        let mut c = GestureClassifier::default();
        assert_eq!(c.handle(scroll(100.0, 0)), vec![Gesture::Rotate]);
        assert!(c.handle(scroll(-40.0, 10)).is_empty());
        assert_eq!(c.rotation(), 30.0);
        assert_eq!(c.idle_deadline(), Some(ms(1510)));
    }

    #[test]
    fn test_idle_reset_is_debounced() {
        let mut c = GestureClassifier::default();
        c.handle(scroll(1.0, 0));
        c.handle(scroll(1.0, 1000));
        assert!(c.advance(ms(1500)).is_empty());
        assert!(c.advance(ms(2499)).is_empty());
        assert_eq!(c.advance(ms(2500)), vec![Gesture::Idle]);
    }

    #[test]
    fn test_idle_reset_when_idle_is_noop() {
        let mut c = GestureClassifier::default();
        c.handle(scroll(1.0, 0));
        c.advance(ms(1500));
        assert!(c.advance(ms(100_000)).is_empty());
        assert_eq!(c.current(), Gesture::Idle);
    }

    #[test]
    fn test_events_fire_overdue_idle_before_applying() {
        let mut c = GestureClassifier::default();
        c.handle(scroll(1.0, 0));
        let changes = c.handle(scroll(1.0, 2000));
        assert_eq!(changes, vec![Gesture::Idle, Gesture::Rotate]);
    }

    #[test]
    fn test_overdue_deadlines_fire_in_order() {
        let mut c = GestureClassifier::default();
        c.handle(scroll(1.0, 0)); // idle at 1500
        c.handle(start(0.0, 0.0, 1000)); // long-press at 1800
        assert_eq!(
            c.advance(ms(2000)),
            vec![Gesture::Idle, Gesture::LongPress]
        );
    }

    #[test]
    fn test_long_press_cancels_pending_idle() {
        let mut c = GestureClassifier::default();
        c.handle(scroll(1.0, 0)); // idle at 1500
        c.handle(start(0.0, 0.0, 100)); // long-press at 900
        assert_eq!(c.advance(ms(900)), vec![Gesture::LongPress]);
        assert!(c.advance(ms(3000)).is_empty());
        assert_eq!(c.current(), Gesture::LongPress);
    }

    #[test]
    fn test_drag_keeps_pending_tap() {
        let mut c = GestureClassifier::default();
        c.handle(start(0.0, 0.0, 0));
        c.handle(end(50));
        c.handle(start(0.0, 0.0, 60));
        assert_eq!(c.handle(mv(40.0, 0.0, 70)), vec![Gesture::PressDrag]);
        c.handle(end(80));
        assert_eq!(c.last_tap_at(), Some(ms(50)));

        c.handle(start(0.0, 0.0, 100));
        assert_eq!(c.handle(end(120)), vec![Gesture::DoubleTap]);
        assert_eq!(c.last_tap_at(), None);
    }

    #[test]
    fn test_long_press_keeps_pending_tap() {
        let mut c = GestureClassifier::new(GestureConfig {
            long_press: ms(100),
            ..GestureConfig::default()
        });
        c.handle(start(0.0, 0.0, 0));
        c.handle(end(20));
        c.handle(start(0.0, 0.0, 30));
        assert_eq!(c.advance(ms(130)), vec![Gesture::LongPress]);
        c.handle(end(150));
        assert_eq!(c.last_tap_at(), Some(ms(20)));

        c.handle(start(0.0, 0.0, 200));
        assert_eq!(c.handle(end(250)), vec![Gesture::DoubleTap]);
    }


    #[test]
    fn test_scroll_during_press_keeps_session() {
        let mut c = GestureClassifier::default();
        c.handle(start(0.0, 0.0, 0));
        assert_eq!(c.handle(scroll(10.0, 100)), vec![Gesture::Rotate]);
        assert!(c.session().is_some());
        assert_eq!(c.long_press_deadline(), Some(ms(800)));
    }

    #[test]
    fn test_malformed_sequences_are_ignored() {
        let mut c = GestureClassifier::default();
        assert!(c.handle(mv(100.0, 100.0, 0)).is_empty());
        assert!(c.handle(end(10)).is_empty());
        assert_eq!(c.current(), Gesture::Idle);
        assert_eq!(c.last_tap_at(), None);
        assert!(c.next_deadline().is_none());
    }

    #[test]
    fn test_second_press_start_replaces_session() {
        let mut c = GestureClassifier::default();
        c.handle(start(0.0, 0.0, 0));
        c.handle(start(50.0, 50.0, 500));
        let session = c.session().unwrap();
        assert_eq!(session.started_at, ms(500));
        assert_eq!(session.start_x, 50.0);
        assert_eq!(c.long_press_deadline(), Some(ms(1300)));
        assert!(c.advance(ms(1299)).is_empty());
    }

    #[test]
    fn test_custom_thresholds() {
        let mut c = GestureClassifier::new(GestureConfig {
            movement_threshold: 2.0,
            long_press: ms(100),
            double_tap_window: ms(50),
            idle_reset: ms(200),
            rotation_per_unit: 1.0,
        });
        c.handle(start(0.0, 0.0, 0));
        assert_eq!(c.handle(mv(3.0, 0.0, 10)), vec![Gesture::PressDrag]);
        c.handle(end(20));
        assert_eq!(c.advance(ms(220)), vec![Gesture::Idle]);
    }

    #[test]
    fn test_next_deadline_is_earliest() {
        let mut c = GestureClassifier::default();
        c.handle(scroll(1.0, 0)); // idle at 1500
        c.handle(start(0.0, 0.0, 100)); // long-press at 900
        assert_eq!(c.next_deadline(), Some(ms(900)));
    }
}
