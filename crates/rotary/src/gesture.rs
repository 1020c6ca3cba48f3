//! Press-drag-release recognition for the rotary dial.
//!
//! The engine is a plain state object. Every input returns the [`Effects`] it
//! produced; the caller publishes the events and arms the requested timers,
//! feeding them back through [`DialGestureEngine::fire`] when they elapse.

use crate::dial::{DialNumber, DialPosition, DialTable};
use crate::events::{Effects, ShellEvent, Status, Timer};
use crate::geometry::{BoundingBox, Point, angle_of, normalize_delta};
use std::time::Duration;

/// Release past this sweep connects regardless of the hole's own stop.
pub const RELEASE_THRESHOLD_DEGREES: f64 = 60.0;
/// Below this the drag is still treated as noise for status purposes.
pub const DIALING_THRESHOLD_DEGREES: f64 = 10.0;
/// Backward travel allowed before the dial stops following.
pub const BACKWARD_SLACK_DEGREES: f64 = -20.0;
pub const SETTLE_DELAY: Duration = Duration::from_millis(700);
pub const STATUS_DISPLAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureTiming {
    pub settle_delay: Duration,
    pub status_display: Duration,
}

impl Default for GestureTiming {
    fn default() -> Self {
        Self {
            settle_delay: SETTLE_DELAY,
            status_display: STATUS_DISPLAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSession {
    pub dial: DialNumber,
    pub start_angle: f64,
    /// Signed travel since the press, never below [`BACKWARD_SLACK_DEGREES`].
    pub sweep: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging(GestureSession),
}

#[derive(Debug, Clone)]
pub struct DialGestureEngine {
    dials: DialTable,
    timing: GestureTiming,
    state: GestureState,
    rotation: f64,
    status: Status,
}

impl DialGestureEngine {
    pub fn new(dials: DialTable, timing: GestureTiming) -> Self {
        Self {
            dials,
            timing,
            state: GestureState::Idle,
            rotation: 0.0,
            status: Status::Idle,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn session(&self) -> Option<&GestureSession> {
        match &self.state {
            GestureState::Dragging(session) => Some(session),
            GestureState::Idle => None,
        }
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn dials(&self) -> &DialTable {
        &self.dials
    }

    /// Swaps the dial table. A drag in progress keeps its hole and start angle.
    pub fn set_dials(&mut self, dials: DialTable) {
        self.dials = dials;
    }

    pub fn set_timing(&mut self, timing: GestureTiming) {
        self.timing = timing;
    }

    pub fn press_start(
        &mut self,
        dial: DialNumber,
        reference: Option<&BoundingBox>,
        pointer: Point,
    ) -> Effects {
        let mut fx = Effects::default();

        if let GestureState::Dragging(session) = &self.state {
            log::debug!(
                "Ignoring press on dial {} while dial {} is held",
                dial,
                session.dial
            );
            return fx;
        }

        let start_angle = angle_of(reference, pointer);
        self.state = GestureState::Dragging(GestureSession {
            dial,
            start_angle,
            sweep: 0.0,
        });
        log::debug!("Dial {} held at {:.1}°", dial, start_angle);

        let name = self.dials.get(dial).display_name();
        self.set_status(Status::Holding(name), &mut fx);
        fx
    }

    pub fn pointer_move(&mut self, reference: Option<&BoundingBox>, pointer: Point) -> Effects {
        let mut fx = Effects::default();

        let GestureState::Dragging(mut session) = self.state else {
            return fx;
        };

        let angle = angle_of(reference, pointer);
        let delta = normalize_delta(angle - session.start_angle).max(BACKWARD_SLACK_DEGREES);

        if delta >= session.dial.required_sweep() {
            self.connect(session.dial, &mut fx);
            return fx;
        }

        session.sweep = delta;
        self.state = GestureState::Dragging(session);
        self.set_rotation(delta, &mut fx);

        if delta > DIALING_THRESHOLD_DEGREES {
            let name = self.dials.get(session.dial).display_name();
            self.set_status(Status::Dialing(name), &mut fx);
        }
        fx
    }

    pub fn pointer_up(&mut self) -> Effects {
        let mut fx = Effects::default();

        let GestureState::Dragging(session) = self.state else {
            return fx;
        };

        if session.sweep > RELEASE_THRESHOLD_DEGREES {
            self.connect(session.dial, &mut fx);
        } else {
            log::debug!(
                "Dial {} released at {:.1}°, returning",
                session.dial,
                session.sweep
            );
            self.state = GestureState::Idle;
            self.set_rotation(0.0, &mut fx);
            self.set_status(Status::Idle, &mut fx);
        }
        fx
    }

    /// The shell closed the contact popup opened by a completed dial.
    pub fn popup_closed(&mut self) -> Effects {
        let mut fx = Effects::default();
        if self.state == GestureState::Idle {
            self.set_status(Status::Idle, &mut fx);
        }
        fx
    }

    pub fn fire(&mut self, timer: Timer) -> Effects {
        let mut fx = Effects::default();

        match timer {
            Timer::Settle(dial) => {
                let position = self.dials.get(dial).clone();
                self.resolve(&position, &mut fx);
            }
            Timer::RevertStatus => {
                if self.state == GestureState::Idle {
                    self.set_status(Status::Idle, &mut fx);
                } else {
                    log::debug!("Skipping status revert during an active drag");
                }
            }
        }
        fx
    }

    fn connect(&mut self, dial: DialNumber, fx: &mut Effects) {
        log::debug!("Dial {} connected", dial);
        self.state = GestureState::Idle;
        self.set_rotation(0.0, fx);
        self.set_status(Status::Connecting, fx);
        fx.schedule(self.timing.settle_delay, Timer::Settle(dial));
    }

    fn resolve(&mut self, position: &DialPosition, fx: &mut Effects) {
        fx.push(ShellEvent::DialCompleted {
            dial: position.number,
            index: position.index(),
            action: position.action_tag().cloned(),
        });

        match &position.action {
            Some(action) if action.kind.opens_popup() => {
                self.set_status(Status::Accessed(action.kind), fx);
            }
            Some(action) => {
                log::debug!("Dial {} resolved to link '{}'", position.number, action.tag);
                fx.schedule(self.timing.status_display, Timer::RevertStatus);
            }
            None => {
                log::debug!("Dial {} has no action", position.number);
                self.set_status(Status::NoSignal, fx);
                fx.schedule(self.timing.status_display, Timer::RevertStatus);
            }
        }
    }

    fn set_status(&mut self, status: Status, fx: &mut Effects) {
        if self.status != status {
            self.status = status.clone();
            fx.push(ShellEvent::StatusChanged { status });
        }
    }

    fn set_rotation(&mut self, degrees: f64, fx: &mut Effects) {
        if self.rotation != degrees {
            self.rotation = degrees;
            fx.push(ShellEvent::RotationChanged { degrees });
        }
    }
}
