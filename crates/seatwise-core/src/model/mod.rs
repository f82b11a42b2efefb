//! Plain records the engine operates on.
//!
//! Attendees and tables are supplied by the surrounding profile and plan
//! stores. Everything here is validated at construction so that a record
//! which reaches the graph or the allocator is already structurally sound.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

pub mod attendee;
pub mod attendee_id;
pub mod table;
pub mod zone;

pub use attendee::{Attendee, Category, PlusOne, Rsvp, Side};
pub use attendee_id::AttendeeId;
pub use table::{Capacity, Point, Shape, Table, TableNumber};
pub use zone::{FixedZone, ZoneKind};

/// A record rejected at construction time.
///
/// These are contract violations by the caller, not engine errors: a value
/// that fails here never becomes part of a plan.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidRecord {
    #[error("attendee id must be non-empty and contain no whitespace, got '{0}'")]
    AttendeeId(String),

    #[error("table capacity must be a positive integer, got {0}")]
    Capacity(u32),

    #[error("{axis} coordinate must be finite and non-negative, got {value}")]
    Coordinate { axis: &'static str, value: f64 },

    #[error("{axis} extent must be finite and positive, got {value}")]
    Extent { axis: &'static str, value: f64 },

    #[error("geometry.{key} must be {expected}, got {value}")]
    Geometry {
        key: &'static str,
        expected: &'static str,
        value: f64,
    },
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

/// Existence lookups the allocator needs from whoever owns attendee records.
///
/// The seating engine never depends on the relationship graph; it only asks
/// whether an id is still known.
pub trait AttendeeDirectory {
    fn contains_attendee(&self, id: &AttendeeId) -> bool;
}

impl AttendeeDirectory for HashSet<AttendeeId> {
    fn contains_attendee(&self, id: &AttendeeId) -> bool {
        self.contains(id)
    }
}

impl AttendeeDirectory for BTreeSet<AttendeeId> {
    fn contains_attendee(&self, id: &AttendeeId) -> bool {
        self.contains(id)
    }
}

impl AttendeeDirectory for [Attendee] {
    fn contains_attendee(&self, id: &AttendeeId) -> bool {
        self.iter().any(|a| &a.id == id)
    }
}

impl AttendeeDirectory for Vec<Attendee> {
    fn contains_attendee(&self, id: &AttendeeId) -> bool {
        self.as_slice().contains_attendee(id)
    }
}
