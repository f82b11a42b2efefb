//! Spatial venue layout and seat allocation.
//!
//! This module is independent of the relationship graph: it only needs to
//! know whether an attendee id exists, which it asks through
//! [`AttendeeDirectory`](crate::model::AttendeeDirectory).
//!
//! - [`geometry`]: footprint rectangles and intersection tests.
//! - [`layout`]: [`VenueLayout`], the tables and fixed zones of one venue.
//! - [`allocate`]: placing tables and assigning seats.
//! - [`stats`]: pure RSVP/seating statistics.
//! - [`audit`]: whole-layout validation.

#![allow(clippy::module_name_repetitions)]

use std::fmt;

use crate::error::ErrorCode;
use crate::model::{AttendeeId, Capacity, TableNumber, ZoneKind};

pub mod allocate;
pub mod audit;
pub mod geometry;
pub mod layout;
pub mod stats;

pub use allocate::{assign_seat, place_table, unassign_seat};
pub use audit::{Violation, validate_layout};
pub use geometry::{Rect, footprint};
pub use layout::VenueLayout;
pub use stats::{SeatingStats, recompute_stats};

/// What a table footprint collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Obstacle {
    Table(TableNumber),
    Zone(ZoneKind),
}

impl fmt::Display for Obstacle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(number) => write!(f, "table {number}"),
            Self::Zone(kind) => write!(f, "the {kind} zone"),
        }
    }
}

/// The record a seating operation could not find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    Attendee(AttendeeId),
    Table(TableNumber),
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attendee(id) => write!(f, "attendee '{id}'"),
            Self::Table(number) => write!(f, "table {number}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeatingError {
    #[error("table number {0} is already in use")]
    DuplicateNumber(TableNumber),

    #[error("table {table} footprint {footprint} extends beyond the venue")]
    Bounds { table: TableNumber, footprint: Rect },

    #[error("table {table} overlaps {with}")]
    Overlap { table: TableNumber, with: Obstacle },

    #[error("table {table} is full ({capacity} seats)")]
    CapacityExceeded { table: TableNumber, capacity: Capacity },

    #[error("attendee '{attendee}' is already seated at table {table}")]
    AlreadySeated { attendee: AttendeeId, table: TableNumber },

    #[error("{0} not found")]
    NotFound(Missing),
}

impl SeatingError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::DuplicateNumber(_) => ErrorCode::DuplicateTableNumber,
            Self::Bounds { .. } => ErrorCode::OutOfBounds,
            Self::Overlap { .. } => ErrorCode::TableOverlap,
            Self::CapacityExceeded { .. } => ErrorCode::CapacityExceeded,
            Self::AlreadySeated { .. } => ErrorCode::AlreadySeated,
            Self::NotFound(Missing::Attendee(_)) => ErrorCode::AttendeeNotFound,
            Self::NotFound(Missing::Table(_)) => ErrorCode::TableNotFound,
        }
    }
}
