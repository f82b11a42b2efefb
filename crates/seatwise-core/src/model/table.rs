use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU16;

use super::{AttendeeId, InvalidRecord};

/// Table number, unique within one venue layout. Doubles as the table id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableNumber(pub u32);

impl fmt::Display for TableNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Round,
    Square,
    Rectangular,
}

impl Shape {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Round => "round",
            Self::Square => "square",
            Self::Rectangular => "rectangular",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seat count of a table. Zero is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Capacity(NonZeroU16);

impl Capacity {
    /// # Errors
    ///
    /// Returns [`InvalidRecord::Capacity`] when `seats` is zero.
    pub fn new(seats: u16) -> Result<Self, InvalidRecord> {
        NonZeroU16::new(seats)
            .map(Self)
            .ok_or(InvalidRecord::Capacity(u32::from(seats)))
    }

    #[must_use]
    pub const fn get(self) -> u16 {
        self.0.get()
    }

    #[must_use]
    pub fn seats(self) -> usize {
        usize::from(self.0.get())
    }
}

impl TryFrom<u16> for Capacity {
    type Error = InvalidRecord;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Capacity> for u16 {
    fn from(value: Capacity) -> Self {
        value.get()
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

#[derive(Deserialize)]
struct RawPoint {
    x: f64,
    y: f64,
}

/// A position in venue coordinates (metres). Finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint")]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// # Errors
    ///
    /// Returns [`InvalidRecord::Coordinate`] for NaN, infinite or negative
    /// coordinates.
    pub fn new(x: f64, y: f64) -> Result<Self, InvalidRecord> {
        check_coordinate("x", x)?;
        check_coordinate("y", y)?;
        Ok(Self { x, y })
    }

    #[must_use]
    pub const fn x(self) -> f64 {
        self.x
    }

    #[must_use]
    pub const fn y(self) -> f64 {
        self.y
    }
}

impl TryFrom<RawPoint> for Point {
    type Error = InvalidRecord;

    fn try_from(raw: RawPoint) -> Result<Self, Self::Error> {
        Self::new(raw.x, raw.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

fn check_coordinate(axis: &'static str, value: f64) -> Result<(), InvalidRecord> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(InvalidRecord::Coordinate { axis, value })
    }
}

/// A seating unit. `position` is the corner with the smallest x and y; the
/// table body extends towards +x and +y.
///
/// The assignment list is ordered by seating time and only mutated through
/// the allocator, which keeps it within capacity and free of duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub number: TableNumber,
    pub shape: Shape,
    pub capacity: Capacity,
    pub position: Point,
    #[serde(default)]
    assigned: Vec<AttendeeId>,
}

impl Table {
    #[must_use]
    pub const fn new(number: TableNumber, shape: Shape, capacity: Capacity, position: Point) -> Self {
        Self {
            number,
            shape,
            capacity,
            position,
            assigned: Vec::new(),
        }
    }

    #[must_use]
    pub fn assigned(&self) -> &[AttendeeId] {
        &self.assigned
    }

    #[must_use]
    pub fn occupied(&self) -> usize {
        self.assigned.len()
    }

    #[must_use]
    pub fn free_seats(&self) -> usize {
        self.capacity.seats().saturating_sub(self.assigned.len())
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.free_seats() == 0
    }

    #[must_use]
    pub fn seats(&self, attendee: &AttendeeId) -> bool {
        self.assigned.contains(attendee)
    }

    pub(crate) fn push_assignment(&mut self, attendee: AttendeeId) {
        self.assigned.push(attendee);
    }

    /// Remove `attendee`, preserving the order of everyone else.
    pub(crate) fn remove_assignment(&mut self, attendee: &AttendeeId) -> bool {
        let before = self.assigned.len();
        self.assigned.retain(|a| a != attendee);
        self.assigned.len() != before
    }

    pub(crate) fn take_assignments(&mut self) -> Vec<AttendeeId> {
        std::mem::take(&mut self.assigned)
    }
}
