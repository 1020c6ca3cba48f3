use crate::geometry::{BoundingBox, Point};
use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use strum::{Display as StrumDisplay, EnumIter, EnumString, IntoEnumIterator};
use thiserror::Error;

pub const DIAL_COUNT: usize = 9;
pub const LAYOUT_START_DEGREES: f64 = -60.0;
pub const LAYOUT_STEP_DEGREES: f64 = 30.0;
pub const SWEEP_BASE_DEGREES: f64 = 50.0;
pub const SWEEP_STEP_DEGREES: f64 = 30.0;
pub const ORBIT_RADIUS: f64 = 130.0; // hole distance from dial centre
pub const HOLE_RADIUS: f64 = 24.0;

/// One of the nine finger holes, numbered as printed on the dial.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    SerializeDisplay,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
pub enum DialNumber {
    #[strum(to_string = "1", serialize = "One")]
    One,
    #[strum(to_string = "2", serialize = "Two")]
    Two,
    #[strum(to_string = "3", serialize = "Three")]
    Three,
    #[strum(to_string = "4", serialize = "Four")]
    Four,
    #[strum(to_string = "5", serialize = "Five")]
    Five,
    #[strum(to_string = "6", serialize = "Six")]
    Six,
    #[strum(to_string = "7", serialize = "Seven")]
    Seven,
    #[strum(to_string = "8", serialize = "Eight")]
    Eight,
    #[strum(to_string = "9", serialize = "Nine")]
    Nine,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DialError {
    #[error("dial index {0} is out of range (expected 0..=8)")]
    IndexOutOfRange(usize),
}

impl DialNumber {
    pub fn as_index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::iter().nth(idx)
    }

    /// Clockwise position of the hole, in degrees from the positive x axis.
    pub fn layout_angle(&self) -> f64 {
        LAYOUT_START_DEGREES + self.as_index() as f64 * LAYOUT_STEP_DEGREES
    }

    /// Sweep that carries this hole to the finger stop. Higher numbers travel further.
    pub fn required_sweep(&self) -> f64 {
        (self.as_index() + 1) as f64 * SWEEP_STEP_DEGREES + SWEEP_BASE_DEGREES
    }
}

impl TryFrom<usize> for DialNumber {
    type Error = DialError;

    fn try_from(idx: usize) -> Result<Self, Self::Error> {
        Self::from_index(idx).ok_or(DialError::IndexOutOfRange(idx))
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ActionTag(String);

crate::impl_string_newtype!(ActionTag);

#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    Deref,
    From,
    Into,
    AsRef,
)]
#[serde(transparent)]
pub struct DialLabel(String);

crate::impl_string_newtype!(DialLabel);

/// What the shell does once a dial connects.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    SerializeDisplay,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
pub enum ActionKind {
    /// Opens the mail popup.
    #[strum(to_string = "EMAIL", serialize = "mail")]
    Email,
    /// Opens the phone popup.
    #[strum(to_string = "PHONE", serialize = "call")]
    Phone,
    /// Navigates to the action's href.
    #[strum(to_string = "LINK", serialize = "url")]
    Link,
}

impl ActionKind {
    pub fn opens_popup(&self) -> bool {
        matches!(self, Self::Email | Self::Phone)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialAction {
    pub tag: ActionTag,
    pub kind: ActionKind,
    #[serde(default)]
    pub href: Option<String>,
}

impl DialAction {
    pub fn new(tag: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            tag: ActionTag::new(tag),
            kind,
            href: None,
        }
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialPosition {
    pub number: DialNumber,
    pub label: DialLabel,
    pub action: Option<DialAction>,
}

impl DialPosition {
    pub fn unassigned(number: DialNumber) -> Self {
        Self {
            number,
            label: DialLabel::default(),
            action: None,
        }
    }

    pub fn index(&self) -> usize {
        self.number.as_index()
    }

    pub fn required_sweep(&self) -> f64 {
        self.number.required_sweep()
    }

    /// Label for status text; unlabeled holes show their number.
    pub fn display_name(&self) -> String {
        if self.label.trim().is_empty() {
            self.number.to_string()
        } else {
            self.label.to_string()
        }
    }

    pub fn action_tag(&self) -> Option<&ActionTag> {
        self.action.as_ref().map(|a| &a.tag)
    }
}

/// Pixel geometry of the dial face relative to its reference box centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DialLayout {
    pub orbit_radius: f64,
    pub hole_radius: f64,
}

impl Default for DialLayout {
    fn default() -> Self {
        Self {
            orbit_radius: ORBIT_RADIUS,
            hole_radius: HOLE_RADIUS,
        }
    }
}

impl DialLayout {
    pub fn hole_center(&self, number: DialNumber, reference: &BoundingBox) -> Point {
        let center = reference.center();
        let angle = number.layout_angle().to_radians();
        Point::new(
            center.x + self.orbit_radius * angle.cos(),
            center.y + self.orbit_radius * angle.sin(),
        )
    }

    /// Hole under the pointer, if any. Overlapping holes resolve to the nearest centre.
    pub fn hit_test(&self, reference: &BoundingBox, pointer: Point) -> Option<DialNumber> {
        if reference.is_degenerate() {
            return None;
        }

        DialNumber::iter()
            .map(|n| (n, self.hole_center(n, reference).distance_to(pointer)))
            .filter(|(_, dist)| *dist <= self.hole_radius)
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(n, _)| n)
    }
}

/// The nine positions of the dial, always complete and in index order.
#[derive(Debug, Clone, PartialEq)]
pub struct DialTable {
    positions: Vec<DialPosition>,
}

impl Default for DialTable {
    fn default() -> Self {
        Self {
            positions: DialNumber::iter().map(DialPosition::unassigned).collect(),
        }
    }
}

impl DialTable {
    pub fn assign(
        &mut self,
        number: DialNumber,
        label: impl Into<String>,
        action: Option<DialAction>,
    ) {
        self.positions[number.as_index()] = DialPosition {
            number,
            label: DialLabel::new(label),
            action,
        };
    }

    pub fn with(
        mut self,
        number: DialNumber,
        label: impl Into<String>,
        action: Option<DialAction>,
    ) -> Self {
        self.assign(number, label, action);
        self
    }

    pub fn get(&self, number: DialNumber) -> &DialPosition {
        &self.positions[number.as_index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &DialPosition> {
        self.positions.iter()
    }

    pub fn assigned(&self) -> impl Iterator<Item = &DialPosition> {
        self.positions.iter().filter(|p| p.action.is_some())
    }
}
