//! A [`TablePlan`] shared between concurrent callers.
//!
//! The published plan sits behind `RwLock<Arc<TablePlan>>`. Readers hold
//! the read lock only long enough to clone the `Arc`, then work on an
//! immutable snapshot. Writers take the write lock, check the caller's
//! version token, and mutate through `Arc::make_mut`, which copies the plan
//! only if some reader still holds the previous snapshot.
//!
//! A poisoned lock is recovered rather than propagated: every plan mutation
//! validates before it writes, so a panicking writer cannot have left a
//! half-applied change behind.

#![allow(clippy::module_name_repetitions)]

use std::sync::{Arc, PoisonError, RwLock};

use super::{TablePlan, Version};
use crate::coordinator;
use crate::error::PlanError;
use crate::graph::Removal;
use crate::model::{Attendee, AttendeeId, Table, TableNumber};
use crate::seating::SeatingStats;

#[derive(Debug)]
pub struct SharedPlan {
    inner: RwLock<Arc<TablePlan>>,
}

impl SharedPlan {
    #[must_use]
    pub fn new(plan: TablePlan) -> Self {
        Self {
            inner: RwLock::new(Arc::new(plan)),
        }
    }

    /// Immutable view of the current plan.
    #[must_use]
    pub fn snapshot(&self) -> Arc<TablePlan> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    #[must_use]
    pub fn version(&self) -> Version {
        self.snapshot().version()
    }

    /// Run `op` against the published plan under the write lock.
    ///
    /// `op` must leave the plan unchanged when it returns an error; every
    /// [`TablePlan`] mutation and coordinator operation does.
    ///
    /// # Errors
    ///
    /// Whatever `op` returns.
    pub fn apply<T, F>(&self, op: F) -> Result<T, PlanError>
    where
        F: FnOnce(&mut TablePlan) -> Result<T, PlanError>,
    {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        op(Arc::make_mut(&mut *guard))
    }

    /// Call `op` with the current version; if it fails with
    /// [`PlanError::StaleVersion`] and the plan allows it, re-read the
    /// version and call `op` exactly once more.
    ///
    /// # Errors
    ///
    /// The error of the last attempt.
    pub fn retry_once_on_stale<T, F>(&self, mut op: F) -> Result<T, PlanError>
    where
        F: FnMut(&Self, Version) -> Result<T, PlanError>,
    {
        let snapshot = self.snapshot();
        match op(self, snapshot.version()) {
            Err(err) if err.is_stale() && snapshot.planning().retry_on_stale => {
                op(self, self.version())
            }
            outcome => outcome,
        }
    }

    // -----------------------------------------------------------------------
    // Delegating mutations
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// See [`TablePlan::insert_attendee`].
    pub fn insert_attendee(&self, expected: Version, attendee: Attendee) -> Result<Version, PlanError> {
        self.apply(|plan| plan.insert_attendee(expected, attendee))
    }

    /// # Errors
    ///
    /// See [`TablePlan::attach`].
    pub fn attach(
        &self,
        expected: Version,
        child: &AttendeeId,
        parent: &AttendeeId,
    ) -> Result<Version, PlanError> {
        self.apply(|plan| plan.attach(expected, child, parent))
    }

    /// # Errors
    ///
    /// See [`TablePlan::detach`].
    pub fn detach(
        &self,
        expected: Version,
        child: &AttendeeId,
    ) -> Result<(Version, Option<AttendeeId>), PlanError> {
        self.apply(|plan| plan.detach(expected, child))
    }

    /// # Errors
    ///
    /// See [`TablePlan::place_table`].
    pub fn place_table(&self, expected: Version, table: Table) -> Result<Version, PlanError> {
        self.apply(|plan| plan.place_table(expected, table))
    }

    /// # Errors
    ///
    /// See [`TablePlan::assign_seat`].
    pub fn assign_seat(
        &self,
        expected: Version,
        attendee: &AttendeeId,
        number: TableNumber,
    ) -> Result<Version, PlanError> {
        self.apply(|plan| plan.assign_seat(expected, attendee, number))
    }

    /// # Errors
    ///
    /// See [`TablePlan::unassign_seat`].
    pub fn unassign_seat(
        &self,
        expected: Version,
        attendee: &AttendeeId,
    ) -> Result<(Version, Option<TableNumber>), PlanError> {
        self.apply(|plan| plan.unassign_seat(expected, attendee))
    }

    /// # Errors
    ///
    /// See [`coordinator::on_attendee_removed`].
    pub fn remove_attendee(
        &self,
        expected: Version,
        id: &AttendeeId,
    ) -> Result<(Version, Removal), PlanError> {
        self.apply(|plan| coordinator::on_attendee_removed(plan, expected, id))
    }

    /// # Errors
    ///
    /// See [`coordinator::on_rsvp_changed`].
    pub fn set_rsvp(
        &self,
        expected: Version,
        id: &AttendeeId,
        confirmed: bool,
    ) -> Result<(Version, SeatingStats), PlanError> {
        self.apply(|plan| coordinator::on_rsvp_changed(plan, expected, id, confirmed))
    }
}

impl From<TablePlan> for SharedPlan {
    fn from(plan: TablePlan) -> Self {
        Self::new(plan)
    }
}
