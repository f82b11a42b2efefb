//! Arena of attendee records keyed by id.
//!
//! # Overview
//!
//! [`FamilyGraph`] owns the attendee collection a plan serves. Records live
//! in an id-indexed map with a separate insertion-order vector, and
//! `parent_id` is only ever a lookup key, so there are no owning pointers
//! between records.
//!
//! # Invariants
//!
//! Mutations made through the graph never introduce a parent link to an
//! unknown id or a loop. Collections loaded with [`FamilyGraph::from_attendees`]
//! keep their links verbatim: dangling parents make roots and loops are
//! broken in the [`Forest`] view and reported by [`FamilyGraph::find_cycles`].
//!
//! # Caching
//!
//! The forest is built on first use and cached until the next mutation.
//! Each mutation bumps [`FamilyGraph::generation`].

#![allow(clippy::module_name_repetitions)]

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::OnceLock;
use tracing::debug;

use super::ancestry::Ancestors;
use super::cycles::find_parent_cycles;
use super::forest::{Forest, build_forest};
use super::GraphError;
use crate::model::{Attendee, AttendeeDirectory, AttendeeId};

/// Result of [`FamilyGraph::remove_attendee`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub attendee: Attendee,
    /// Former children, now roots, in insertion order.
    pub promoted: Vec<AttendeeId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Attendee>", into = "Vec<Attendee>")]
pub struct FamilyGraph {
    records: HashMap<AttendeeId, Attendee>,
    order: Vec<AttendeeId>,
    generation: u64,
    cache: OnceLock<Forest>,
}

impl PartialEq for FamilyGraph {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order && self.records == other.records
    }
}

impl FamilyGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a collection as supplied by the profile store.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateAttendee`] if two records share an id.
    pub fn from_attendees<I>(attendees: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = Attendee>,
    {
        let mut graph = Self::new();
        for attendee in attendees {
            match graph.records.entry(attendee.id.clone()) {
                Entry::Occupied(_) => return Err(GraphError::DuplicateAttendee(attendee.id)),
                Entry::Vacant(slot) => {
                    graph.order.push(attendee.id.clone());
                    slot.insert(attendee);
                }
            }
        }
        Ok(graph)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &AttendeeId) -> bool {
        self.records.contains_key(id)
    }

    #[must_use]
    pub fn get(&self, id: &AttendeeId) -> Option<&Attendee> {
        self.records.get(id)
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Attendee> + '_ {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    /// Bumped by every mutation; stamped onto each built forest.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// The cached forest, built on first call after a mutation.
    pub fn forest(&self) -> &Forest {
        self.cache
            .get_or_init(|| build_forest(self.iter()).stamped(self.generation))
    }

    /// Lazy walk from `id`'s parent to its root.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if `id` is unknown.
    pub fn ancestors_of(&self, id: &AttendeeId) -> Result<Ancestors<'_>, GraphError> {
        let attendee = self
            .get(id)
            .ok_or_else(|| GraphError::NotFound(id.clone()))?;
        Ok(Ancestors::new(self, attendee))
    }

    /// `true` if `candidate` is `id` itself or one of its ancestors.
    fn is_self_or_ancestor(&self, candidate: &AttendeeId, id: &AttendeeId) -> bool {
        candidate == id
            || self
                .ancestors_of(id)
                .is_ok_and(|mut walk| walk.any(|a| a == candidate))
    }

    /// Loops among the raw parent links, each listed in insertion order.
    #[must_use]
    pub fn find_cycles(&self) -> Vec<Vec<AttendeeId>> {
        find_parent_cycles(self.iter())
    }

    /// Check that `child -> parent` could be attached without mutating.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if either id is unknown and
    /// [`GraphError::Cycle`] if `child` is `parent` or one of its ancestors.
    pub fn check_link(&self, child: &AttendeeId, parent: &AttendeeId) -> Result<(), GraphError> {
        if !self.contains(child) {
            return Err(GraphError::NotFound(child.clone()));
        }
        if !self.contains(parent) {
            return Err(GraphError::NotFound(parent.clone()));
        }
        if self.is_self_or_ancestor(child, parent) {
            return Err(GraphError::Cycle {
                child: child.clone(),
                parent: parent.clone(),
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Add a new record.
    ///
    /// # Errors
    ///
    /// - [`GraphError::DuplicateAttendee`] if the id is taken.
    /// - [`GraphError::Cycle`] if the record names itself as parent.
    /// - [`GraphError::NotFound`] if the named parent is unknown.
    pub fn insert(&mut self, attendee: Attendee) -> Result<(), GraphError> {
        if self.contains(&attendee.id) {
            return Err(GraphError::DuplicateAttendee(attendee.id));
        }
        if let Some(parent) = attendee.parent_id.as_ref() {
            if parent == &attendee.id {
                return Err(GraphError::Cycle {
                    child: attendee.id.clone(),
                    parent: parent.clone(),
                });
            }
            if !self.contains(parent) {
                return Err(GraphError::NotFound(parent.clone()));
            }
        }
        debug!(attendee = %attendee.id, "attendee inserted");
        self.order.push(attendee.id.clone());
        self.records.insert(attendee.id.clone(), attendee);
        self.invalidate();
        Ok(())
    }

    /// Replace an existing record, keeping its insertion position.
    ///
    /// # Errors
    ///
    /// [`GraphError::NotFound`] if the id or a changed parent is unknown;
    /// [`GraphError::Cycle`] if a changed parent would close a loop.
    pub fn update(&mut self, attendee: Attendee) -> Result<Attendee, GraphError> {
        let current = self
            .get(&attendee.id)
            .ok_or_else(|| GraphError::NotFound(attendee.id.clone()))?;
        if current.parent_id != attendee.parent_id {
            if let Some(parent) = attendee.parent_id.as_ref() {
                self.check_link(&attendee.id, parent)?;
            }
        }
        let slot = self
            .records
            .get_mut(&attendee.id)
            .ok_or_else(|| GraphError::NotFound(attendee.id.clone()))?;
        let previous = std::mem::replace(slot, attendee);
        self.invalidate();
        Ok(previous)
    }

    /// Link `child` under `parent`.
    ///
    /// # Errors
    ///
    /// See [`FamilyGraph::check_link`]. The graph is unchanged on error.
    pub fn attach(&mut self, child: &AttendeeId, parent: &AttendeeId) -> Result<(), GraphError> {
        self.check_link(child, parent)?;
        if let Some(record) = self.records.get_mut(child) {
            record.parent_id = Some(parent.clone());
        }
        debug!(%child, %parent, "link attached");
        self.invalidate();
        Ok(())
    }

    /// Make `child` a root. Returns the parent id it held, if any.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if `child` is unknown.
    pub fn detach(&mut self, child: &AttendeeId) -> Result<Option<AttendeeId>, GraphError> {
        let record = self
            .records
            .get_mut(child)
            .ok_or_else(|| GraphError::NotFound(child.clone()))?;
        let previous = record.parent_id.take();
        if let Some(parent) = previous.as_ref() {
            debug!(%child, %parent, "link detached");
        }
        self.invalidate();
        Ok(previous)
    }

    /// Promote every direct child of `id` to a root, then remove `id`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if `id` is unknown; nothing changes.
    pub fn remove_attendee(&mut self, id: &AttendeeId) -> Result<Removal, GraphError> {
        if !self.contains(id) {
            return Err(GraphError::NotFound(id.clone()));
        }

        let mut promoted = Vec::new();
        for key in &self.order {
            if key == id {
                continue;
            }
            if let Some(record) = self.records.get_mut(key) {
                if record.parent_id.as_ref() == Some(id) {
                    record.parent_id = None;
                    promoted.push(key.clone());
                }
            }
        }

        let attendee = self
            .records
            .remove(id)
            .ok_or_else(|| GraphError::NotFound(id.clone()))?;
        self.order.retain(|key| key != id);
        debug!(attendee = %id, promoted = promoted.len(), "attendee removed");
        self.invalidate();
        Ok(Removal { attendee, promoted })
    }

    /// Set RSVP confirmation. Returns `true` if the value changed.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if `id` is unknown.
    pub fn set_confirmed(&mut self, id: &AttendeeId, confirmed: bool) -> Result<bool, GraphError> {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| GraphError::NotFound(id.clone()))?;
        let changed = record.rsvp.confirmed != confirmed;
        record.rsvp.confirmed = confirmed;
        self.invalidate();
        Ok(changed)
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.cache = OnceLock::new();
    }
}

impl AttendeeDirectory for FamilyGraph {
    fn contains_attendee(&self, id: &AttendeeId) -> bool {
        self.contains(id)
    }
}

impl TryFrom<Vec<Attendee>> for FamilyGraph {
    type Error = GraphError;

    fn try_from(attendees: Vec<Attendee>) -> Result<Self, Self::Error> {
        Self::from_attendees(attendees)
    }
}

impl From<FamilyGraph> for Vec<Attendee> {
    fn from(mut graph: FamilyGraph) -> Self {
        graph
            .order
            .iter()
            .filter_map(|id| graph.records.remove(id))
            .collect()
    }
}
