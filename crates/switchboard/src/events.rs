use rotary::events::Timer;
use rotary::geometry::{BoundingBox, Point};
use serde::Deserialize;

/// Pointer and layout input from the page, one JSON object per line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    Layout {
        #[serde(default)]
        dial: Option<BoundingBox>,
        #[serde(default)]
        portrait: Option<BoundingBox>,
    },
    Press {
        /// Number printed on the hole; hit-tested from the pointer when absent.
        #[serde(default)]
        dial: Option<u8>,
        x: f64,
        y: f64,
    },
    Move {
        x: f64,
        y: f64,
    },
    Up,
    PopupClosed,
}

impl InputEvent {
    pub fn pointer(&self) -> Option<Point> {
        match self {
            Self::Press { x, y, .. } | Self::Move { x, y } => Some(Point::new(*x, *y)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    Input(InputEvent),
    InputClosed,
    Timer(Timer),
    ConfigReload,
}
