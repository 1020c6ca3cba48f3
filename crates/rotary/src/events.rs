use crate::dial::{ActionKind, ActionTag, DialNumber};
use crate::gaze::GazeFrame;
use derive_more::Display;
use serde::Serialize;
use serde_with::SerializeDisplay;
use std::time::Duration;

/// Line shown under the dial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Display, SerializeDisplay)]
pub enum Status {
    #[default]
    #[display("SECURE LINE // IDLE")]
    Idle,
    #[display("HOLDING {_0}...")]
    Holding(String),
    #[display("DIALING {_0}...")]
    Dialing(String),
    #[display("CONNECTING...")]
    Connecting,
    #[display("{_0} ACCESSED")]
    Accessed(ActionKind),
    #[display("NO SIGNAL")]
    NoSignal,
}

/// Everything the presentation layer has to render or act on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ShellEvent {
    #[serde(rename = "status")]
    StatusChanged { status: Status },
    #[serde(rename = "rotation")]
    RotationChanged { degrees: f64 },
    DialCompleted {
        dial: DialNumber,
        index: usize,
        action: Option<ActionTag>,
    },
    #[serde(rename = "gaze")]
    GazeChanged(GazeFrame),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// Connection delay after a successful dial.
    Settle(DialNumber),
    /// Transient outcome text falls back to idle.
    RevertStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRequest {
    pub delay: Duration,
    pub timer: Timer,
}

/// Output of one engine step: events to publish now, timers to arm.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Effects {
    pub events: Vec<ShellEvent>,
    pub timers: Vec<TimerRequest>,
}

impl Effects {
    pub fn push(&mut self, event: ShellEvent) {
        self.events.push(event);
    }

    pub fn schedule(&mut self, delay: Duration, timer: Timer) {
        self.timers.push(TimerRequest { delay, timer });
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.timers.is_empty()
    }

    pub fn completions(&self) -> impl Iterator<Item = &ShellEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, ShellEvent::DialCompleted { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gaze::{EyeAnchor, Gaze, GazeOffsetMapper, Offset};
    use crate::geometry::BoundingBox;

    #[test]
    fn test_status_text() {
        let cases = vec![
            (Status::Idle, "SECURE LINE // IDLE"),
            (Status::Holding("EMAIL".into()), "HOLDING EMAIL..."),
            (Status::Dialing("5".into()), "DIALING 5..."),
            (Status::Connecting, "CONNECTING..."),
            (Status::Accessed(ActionKind::Phone), "PHONE ACCESSED"),
            (Status::NoSignal, "NO SIGNAL"),
        ];

        for (status, expected) in cases {
            assert_eq!(status.to_string(), expected);
        }
    }

    #[test]
    fn test_shell_event_wire_format() {
        let json = serde_json::to_value(ShellEvent::StatusChanged {
            status: Status::Connecting,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"event": "status", "status": "CONNECTING..."})
        );

        let json = serde_json::to_value(ShellEvent::DialCompleted {
            dial: DialNumber::Two,
            index: 1,
            action: Some(ActionTag::new("github-link")),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "event": "dial_completed",
                "dial": "2",
                "index": 1,
                "action": "github-link"
            })
        );

        let mapper = GazeOffsetMapper::new(EyeAnchor::LEFT, EyeAnchor::RIGHT);
        let portrait = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let gaze = Gaze {
            left: Offset::new(1.0, 0.0),
            right: Offset::ZERO,
        };
        let json = serde_json::to_value(ShellEvent::GazeChanged(mapper.frame(&portrait, gaze)))
            .unwrap();
        assert_eq!(json["event"], "gaze");
        assert_eq!(json["left"]["dx"], 1.0);
        assert_eq!(json["left"]["dy"], 0.0);
        let origin = &json["right"]["origin"];
        assert!((origin["x"].as_f64().unwrap() - 51.0).abs() < 1e-9);
        assert!((origin["y"].as_f64().unwrap() - 41.0).abs() < 1e-9);
    }
}
