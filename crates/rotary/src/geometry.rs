use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Screen-space rectangle of a reference element, as reported by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Zero, negative or non-finite extents.
    pub fn is_degenerate(&self) -> bool {
        let finite = [self.left, self.top, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        !finite || self.width <= 0.0 || self.height <= 0.0
    }

    pub fn contains_y(&self, y: f64) -> bool {
        y >= self.top && y <= self.bottom()
    }

    /// Absolute position of a point given as fractions of the box extents.
    pub fn at_fraction(&self, x_frac: f64, y_frac: f64) -> Point {
        Point::new(
            self.left + x_frac * self.width,
            self.top + y_frac * self.height,
        )
    }

    pub fn angle_to(&self, pointer: Point) -> f64 {
        angle_of(Some(self), pointer)
    }
}

/// Angle in degrees from the centre of `reference` to `pointer`, in (-180, 180].
///
/// A missing or degenerate reference yields 0.
pub fn angle_of(reference: Option<&BoundingBox>, pointer: Point) -> f64 {
    let Some(reference) = reference.filter(|r| !r.is_degenerate()) else {
        return 0.0;
    };

    let center = reference.center();
    let (dx, dy) = (pointer.x - center.x, pointer.y - center.y);
    let degrees = dy.atan2(dx).to_degrees();

    if !degrees.is_finite() {
        0.0
    } else if degrees <= -180.0 {
        degrees + 360.0
    } else {
        degrees
    }
}

/// Folds a difference of two angles back into (-180, 180] with a single
/// correction, so a drag crossing the seam due left of centre stays continuous.
pub fn normalize_delta(delta: f64) -> f64 {
    if delta <= -180.0 {
        delta + 360.0
    } else if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}
