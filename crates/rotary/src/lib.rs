//! Interaction core of the rotary contact dial and the eye-tracking portrait.
//!
//! - [`geometry`]: pointer angle relative to a reference box
//! - [`dial`]: the nine holes, their actions and layout
//! - [`gesture`]: press-drag-release state machine
//! - [`gaze`]: clamped iris offsets toward the pointer
//! - [`events`]: what the presentation layer receives

pub mod macros;

pub mod dial;
pub mod events;
pub mod gaze;
pub mod geometry;
pub mod gesture;

pub use dial::{ActionKind, ActionTag, DialAction, DialLayout, DialNumber, DialPosition, DialTable};
pub use events::{Effects, ShellEvent, Status, Timer, TimerRequest};
pub use gaze::{EyeAnchor, Gaze, GazeFrame, GazeOffsetMapper, IrisPlacement, Offset};
pub use geometry::{BoundingBox, Point, angle_of};
pub use gesture::{DialGestureEngine, GestureSession, GestureState, GestureTiming};
