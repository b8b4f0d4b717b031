//! Gesture Engine
//!
//! Drives a [`GestureClassifier`] from a tokio task: stamps incoming pointer
//! input with a monotonic clock, sleeps until the classifier's next deadline,
//! and publishes every transition.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::debug;

use crate::classifier::GestureClassifier;
use crate::gesture::{Gesture, GestureConfig, PointerInput};

/// A gesture transition (sent through channels)
#[derive(Clone, Debug, PartialEq)]
pub struct GestureUpdate {
    pub gesture: Gesture,
    /// Accumulated ring rotation in degrees at the time of the transition
    pub rotation: f64,
    /// Time since the engine started
    pub at: Duration,
}

/// Spawn an engine task that classifies pointer input and emits gesture
/// transitions.
///
/// The task ends when the input channel closes or the update receiver is
/// dropped. Pending deadlines are discarded with it.
pub fn spawn_gesture_engine(
    mut input_rx: mpsc::Receiver<PointerInput>,
    update_tx: mpsc::Sender<GestureUpdate>,
    config: GestureConfig,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let origin = Instant::now();
        let mut classifier = GestureClassifier::new(config);

        loop {
            let deadline = classifier.next_deadline().map(|d| origin + d);

            // Input first: a move that lands on the long-press deadline wins
            let changes = tokio::select! {
                biased;

                input = input_rx.recv() => match input {
                    Some(input) => classifier.handle(input.at(origin.elapsed())),
                    None => break,
                },
                _ = sleep_until_deadline(deadline) => {
                    classifier.advance(origin.elapsed())
                }
            };

            for gesture in changes {
                let update = GestureUpdate {
                    gesture,
                    rotation: classifier.rotation(),
                    at: origin.elapsed(),
                };
                if update_tx.send(update).await.is_err() {
                    debug!("Gesture update receiver dropped, stopping engine");
                    return;
                }
            }
        }

        debug!("Pointer input closed, stopping engine");
    })
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channels() -> (
        mpsc::Sender<PointerInput>,
        mpsc::Receiver<GestureUpdate>,
        tokio::task::JoinHandle<()>,
    ) {
        let (input_tx, input_rx) = mpsc::channel(16);
        let (update_tx, update_rx) = mpsc::channel(16);
        let handle = spawn_gesture_engine(input_rx, update_tx, GestureConfig::default());
        (input_tx, update_rx, handle)
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_press_fires_from_timer() {
        let (input_tx, mut update_rx, _handle) = channels();
        input_tx
            .send(PointerInput::PressStart { x: 0.0, y: 0.0 })
            .await
            .unwrap();

        let update = update_rx.recv().await.unwrap();
        assert_eq!(update.gesture, Gesture::LongPress);
        assert_eq!(update.at, Duration::from_millis(800));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_reset_after_release() {
        let (input_tx, mut update_rx, _handle) = channels();
        input_tx
            .send(PointerInput::PressStart { x: 0.0, y: 0.0 })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        input_tx
            .send(PointerInput::PressMove { x: 15.0, y: 0.0 })
            .await
            .unwrap();

        let drag = update_rx.recv().await.unwrap();
        assert_eq!(drag.gesture, Gesture::PressDrag);
        assert_eq!(drag.at, Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(50)).await;
        input_tx.send(PointerInput::PressEnd).await.unwrap();

        let idle = update_rx.recv().await.unwrap();
        assert_eq!(idle.gesture, Gesture::Idle);
        assert_eq!(idle.at, Duration::from_millis(1600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_tap_through_engine() {
        let (input_tx, mut update_rx, _handle) = channels();
        let script = [
            (0, PointerInput::PressStart { x: 0.0, y: 0.0 }),
            (100, PointerInput::PressEnd),
            (50, PointerInput::PressStart { x: 1.0, y: 1.0 }),
            (100, PointerInput::PressEnd),
        ];
        for (pause, input) in script {
            tokio::time::sleep(Duration::from_millis(pause)).await;
            input_tx.send(input).await.unwrap();
        }

        let update = update_rx.recv().await.unwrap();
        assert_eq!(update.gesture, Gesture::DoubleTap);
        assert_eq!(update.at, Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_reports_rotation() {
        let (input_tx, mut update_rx, _handle) = channels();
        input_tx
            .send(PointerInput::Scroll { delta_y: 90.0 })
            .await
            .unwrap();

        let update = update_rx.recv().await.unwrap();
        assert_eq!(update.gesture, Gesture::Rotate);
        assert_eq!(update.rotation, 45.0);

        let idle = update_rx.recv().await.unwrap();
        assert_eq!(idle.gesture, Gesture::Idle);
        assert_eq!(idle.at, Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_on_long_press_deadline_drags() {
        let (input_tx, input_rx) = mpsc::channel(16);
        let (update_tx, mut update_rx) = mpsc::channel(16);
        let config = GestureConfig {
            long_press: Duration::ZERO,
            ..GestureConfig::default()
        };
        let handle = spawn_gesture_engine(input_rx, update_tx, config);

        // Both queued before the engine runs, so the move is ready on the
        // same instant the long-press deadline is due.
        input_tx
            .send(PointerInput::PressStart { x: 0.0, y: 0.0 })
            .await
            .unwrap();
        input_tx
            .send(PointerInput::PressMove { x: 20.0, y: 0.0 })
            .await
            .unwrap();

        let update = update_rx.recv().await.unwrap();
        assert_eq!(update.gesture, Gesture::PressDrag);
        assert_eq!(update.at, Duration::ZERO);

        drop(input_tx);
        handle.await.unwrap();
        assert!(update_rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_engine_stops_when_input_closes() {
        let (input_tx, _update_rx, handle) = channels();
        drop(input_tx);
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_engine_stops_when_receiver_dropped() {
        let (input_tx, update_rx, handle) = channels();
        drop(update_rx);
        input_tx
            .send(PointerInput::Scroll { delta_y: 1.0 })
            .await
            .unwrap();
        handle.await.unwrap();
    }
}
