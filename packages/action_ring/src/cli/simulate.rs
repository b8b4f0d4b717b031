//! `action-ring simulate`: run a scripted pointer session through the
//! classifier offline and print every transition with its time.
//!
//! Script format, one event per line:
//!
//! ```text
//! # t_ms  event
//! 0     down 10 10
//! 40    move 30 10
//! 200   up
//! 2000  scroll -120
//! ```
//!
//! Blank lines and `#` comments are ignored. Times must not go backwards.

use std::time::Duration;

use ring_gesture::{Gesture, GestureClassifier, GestureConfig, PointerEvent};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ScriptError {
    pub line: usize,
    pub message: String,
}

impl ScriptError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// One reported transition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub at_ms: u64,
    pub gesture: Gesture,
    pub rotation: f64,
}

pub fn parse_script(script: &str) -> Result<Vec<PointerEvent>, ScriptError> {
    let mut events = Vec::new();
    let mut last = Duration::ZERO;

    for (idx, raw) in script.lines().enumerate() {
        let line = idx + 1;
        let text = raw.split('#').next().unwrap_or("").trim();
        if text.is_empty() {
            continue;
        }

        let mut parts = text.split_whitespace();
        let at = parts
            .next()
            .and_then(|t| t.parse::<u64>().ok())
            .map(Duration::from_millis)
            .ok_or_else(|| ScriptError::new(line, "expected a time in milliseconds"))?;
        if at < last {
            return Err(ScriptError::new(line, "time goes backwards"));
        }
        last = at;

        let kind = parts
            .next()
            .ok_or_else(|| ScriptError::new(line, "missing event"))?;
        let args = parts
            .map(|p| {
                p.parse::<f64>()
                    .map_err(|_| ScriptError::new(line, format!("not a number: {p}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let event = match (kind, args.as_slice()) {
            ("down", [x, y]) => PointerEvent::PressStart { x: *x, y: *y, at },
            ("move", [x, y]) => PointerEvent::PressMove { x: *x, y: *y, at },
            ("up", []) => PointerEvent::PressEnd { at },
            ("scroll", [delta_y]) => PointerEvent::Scroll {
                delta_y: *delta_y,
                at,
            },
            ("down" | "move" | "up" | "scroll", _) => {
                return Err(ScriptError::new(
                    line,
                    format!("wrong number of arguments for {kind}"),
                ));
            }
            _ => return Err(ScriptError::new(line, format!("unknown event: {kind}"))),
        };
        events.push(event);
    }

    Ok(events)
}

/// Feed events through a fresh classifier, then let pending timers run out.
pub fn simulate(events: &[PointerEvent], config: GestureConfig) -> Vec<Transition> {
    let mut classifier = GestureClassifier::new(config);
    let mut transitions = Vec::new();

    let mut record = |classifier: &GestureClassifier, at: Duration, changes: Vec<Gesture>| {
        for gesture in changes {
            transitions.push(Transition {
                at_ms: at.as_millis() as u64,
                gesture,
                rotation: classifier.rotation(),
            });
        }
    };

    for event in events {
        // Timers due strictly before the event fire at their own time
        while let Some(deadline) = classifier.next_deadline().filter(|d| *d < event.at()) {
            let changes = classifier.advance(deadline);
            record(&classifier, deadline, changes);
        }
        let changes = classifier.handle(*event);
        record(&classifier, event.at(), changes);
    }

    while let Some(deadline) = classifier.next_deadline() {
        let changes = classifier.advance(deadline);
        record(&classifier, deadline, changes);
    }

    transitions
}
