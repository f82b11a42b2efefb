//! Relationship graph over attendee records.
//!
//! Attendees form a forest through their optional `parent_id`. This module
//! builds that forest, answers traversal questions, and applies link
//! mutations that keep it acyclic.
//!
//! - [`FamilyGraph`]: the arena of records and the cached [`Forest`].
//! - [`build_forest`]: pure forest construction over any collection.
//! - [`Ancestors`]: lazy upward walk.
//! - [`find_parent_cycles`]: loop detection over raw links.

use crate::error::ErrorCode;
use crate::model::AttendeeId;

pub mod ancestry;
pub mod cycles;
pub mod family;
pub mod forest;

pub use ancestry::Ancestors;
pub use cycles::find_parent_cycles;
pub use family::{FamilyGraph, Removal};
pub use forest::{BrokenLink, Forest, ForestNode, Preorder, build_forest};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("attendee '{0}' not found")]
    NotFound(AttendeeId),

    #[error("linking '{child}' under '{parent}' would create a cycle")]
    Cycle { child: AttendeeId, parent: AttendeeId },

    #[error("attendee '{0}' already exists")]
    DuplicateAttendee(AttendeeId),
}

impl GraphError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound(_) => ErrorCode::AttendeeNotFound,
            Self::Cycle { .. } => ErrorCode::CycleDetected,
            Self::DuplicateAttendee(_) => ErrorCode::DuplicateAttendee,
        }
    }
}
