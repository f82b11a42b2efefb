//! Versioned plan state and the shared handle concurrent callers use.
//!
//! # Overview
//!
//! A [`TablePlan`] bundles one venue layout with the attendee graph it
//! serves. Every mutation takes the [`Version`] the caller last read and
//! fails with [`PlanError::StaleVersion`](crate::error::PlanError) if the
//! plan has moved on; a successful mutation returns the next version.
//!
//! [`SharedPlan`] publishes a plan behind a lock. Readers take a cheap
//! snapshot and never wait on a writer's work; writers are serialized and
//! copy the plan only when a snapshot is still alive.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod shared;
pub mod table_plan;

pub use shared::SharedPlan;
pub use table_plan::TablePlan;

/// Optimistic-concurrency token. Starts at 1 and increases by one with
/// every committed mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(u64);

impl Version {
    pub const INITIAL: Self = Self(1);

    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_start_at_one_and_increase() {
        assert_eq!(Version::default(), Version::new(1));
        assert_eq!(Version::INITIAL.next().get(), 2);
        assert!(Version::new(3) < Version::new(4));
    }

    #[test]
    fn display_is_prefixed() {
        assert_eq!(Version::new(12).to_string(), "v12");
    }
}
