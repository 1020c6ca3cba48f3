use crate::geometry::{BoundingBox, Point};
use serde::{Deserialize, Serialize};

/// Fixed eye socket on the portrait, in fractions of the portrait box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeAnchor {
    pub x_frac: f64,
    pub y_frac: f64,
    pub iris_radius_px: f64,
    pub max_offset_px: f64,
}

impl EyeAnchor {
    pub const LEFT: Self = Self {
        x_frac: 0.467,
        y_frac: 0.483,
        iris_radius_px: 7.0,
        max_offset_px: 6.0,
    };

    pub const RIGHT: Self = Self {
        x_frac: 0.58,
        y_frac: 0.48,
        iris_radius_px: 7.0,
        max_offset_px: 6.0,
    };

    pub fn center_in(&self, portrait: &BoundingBox) -> Point {
        portrait.at_fraction(self.x_frac, self.y_frac)
    }

    /// Top-left corner of the iris layer once `offset` is applied.
    pub fn iris_origin(&self, portrait: &BoundingBox, offset: Offset) -> Point {
        let center = self.center_in(portrait);
        Point::new(
            center.x - self.iris_radius_px + offset.dx,
            center.y - self.iris_radius_px + offset.dy,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Offset {
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };

    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn magnitude(&self) -> f64 {
        self.dx.hypot(self.dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Gaze {
    pub left: Offset,
    pub right: Offset,
}

impl Gaze {
    pub const FORWARD: Self = Self {
        left: Offset::ZERO,
        right: Offset::ZERO,
    };
}

/// One iris layer as a renderer places it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IrisPlacement {
    #[serde(flatten)]
    pub offset: Offset,
    pub origin: Point,
}

/// Gaze offsets resolved against the portrait box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GazeFrame {
    pub left: IrisPlacement,
    pub right: IrisPlacement,
}

/// Iris displacement for one eye: toward the pointer, never further than
/// `max_offset_px`. Pointers above or below the portrait look straight ahead.
pub fn offset_for(anchor: &EyeAnchor, portrait: &BoundingBox, pointer: Point) -> Offset {
    if portrait.is_degenerate() || !portrait.contains_y(pointer.y) {
        return Offset::ZERO;
    }

    let center = anchor.center_in(portrait);
    let (dx, dy) = (pointer.x - center.x, pointer.y - center.y);
    let distance = dx.hypot(dy);
    let clamped = distance.min(anchor.max_offset_px.max(0.0));
    let scale = if distance > 0.0 {
        clamped / distance
    } else {
        0.0
    };

    Offset::new(dx * scale, dy * scale)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeOffsetMapper {
    pub left: EyeAnchor,
    pub right: EyeAnchor,
}

impl Default for GazeOffsetMapper {
    fn default() -> Self {
        Self::new(EyeAnchor::LEFT, EyeAnchor::RIGHT)
    }
}

impl GazeOffsetMapper {
    pub fn new(left: EyeAnchor, right: EyeAnchor) -> Self {
        Self { left, right }
    }

    pub fn map(&self, portrait: &BoundingBox, pointer: Point) -> Gaze {
        if !portrait.contains_y(pointer.y) {
            return Gaze::FORWARD;
        }

        Gaze {
            left: offset_for(&self.left, portrait, pointer),
            right: offset_for(&self.right, portrait, pointer),
        }
    }

    pub fn frame(&self, portrait: &BoundingBox, gaze: Gaze) -> GazeFrame {
        let place = |anchor: &EyeAnchor, offset: Offset| IrisPlacement {
            offset,
            origin: anchor.iris_origin(portrait, offset),
        };

        GazeFrame {
            left: place(&self.left, gaze.left),
            right: place(&self.right, gaze.right),
        }
    }
}
