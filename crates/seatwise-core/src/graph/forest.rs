//! Forest view over a flat attendee collection.
//!
//! Roots are attendees without a usable parent link. Every other attendee
//! hangs under its parent, children ordered bride-side first, then
//! groom-side, then common, and by input order within a side. The output
//! depends only on the input order, so rebuilding an unchanged collection
//! yields an identical forest.

#![allow(clippy::module_name_repetitions)]

use serde::Serialize;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

use super::cycles::find_parent_cycles;
use crate::model::{Attendee, AttendeeId, Side};

/// One attendee and its descendants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForestNode {
    pub id: AttendeeId,
    pub side: Side,
    pub children: Vec<ForestNode>,
}

impl ForestNode {
    /// Number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn size(&self) -> usize {
        self.iter().count()
    }

    /// Pre-order walk of this subtree.
    #[must_use]
    pub fn iter(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }
}

/// A parent link dropped while building the forest because it closed a loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLink {
    pub attendee: AttendeeId,
    pub parent: AttendeeId,
}

/// The bride, groom and common sub-forests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Forest {
    bride: Vec<ForestNode>,
    groom: Vec<ForestNode>,
    common: Vec<ForestNode>,
    broken_links: Vec<BrokenLink>,
    generation: u64,
}

impl Forest {
    #[must_use]
    pub fn roots(&self, side: Side) -> &[ForestNode] {
        match side {
            Side::Bride => &self.bride,
            Side::Groom => &self.groom,
            Side::Common => &self.common,
        }
    }

    /// All roots, bride sub-forest first.
    pub fn all_roots(&self) -> impl Iterator<Item = &ForestNode> {
        self.bride
            .iter()
            .chain(self.groom.iter())
            .chain(self.common.iter())
    }

    /// Pre-order walk over every tree, bride sub-forest first.
    pub fn iter(&self) -> impl Iterator<Item = &ForestNode> {
        self.all_roots().flat_map(ForestNode::iter)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    #[must_use]
    pub fn find(&self, id: &AttendeeId) -> Option<&ForestNode> {
        self.iter().find(|node| &node.id == id)
    }

    #[must_use]
    pub fn is_root(&self, id: &AttendeeId) -> bool {
        self.all_roots().any(|node| &node.id == id)
    }

    /// Links that were ignored because they formed a cycle in the input.
    #[must_use]
    pub fn broken_links(&self) -> &[BrokenLink] {
        &self.broken_links
    }

    /// Generation of the graph this forest was built from; zero for forests
    /// built directly from a slice.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn stamped(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }
}

/// Pre-order iterator over forest nodes.
#[derive(Debug, Clone)]
pub struct Preorder<'f> {
    stack: Vec<&'f ForestNode>,
}

impl<'f> Iterator for Preorder<'f> {
    type Item = &'f ForestNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Build the forest for `attendees`.
///
/// A record whose `parent_id` is missing from the collection becomes a root.
/// When parent links loop, the earliest member of each loop is promoted to a
/// root and the dropped link is recorded in [`Forest::broken_links`], so the
/// node count always equals the number of distinct ids.
pub fn build_forest<'a, I>(attendees: I) -> Forest
where
    I: IntoIterator<Item = &'a Attendee>,
{
    let mut records: Vec<&Attendee> = Vec::new();
    let mut position: HashMap<&AttendeeId, usize> = HashMap::new();
    for attendee in attendees {
        if let Entry::Vacant(slot) = position.entry(&attendee.id) {
            slot.insert(records.len());
            records.push(attendee);
        }
    }

    let mut parent: Vec<Option<usize>> = records
        .iter()
        .map(|a| a.parent_id.as_ref().and_then(|p| position.get(p).copied()))
        .collect();

    let mut broken_links = Vec::new();
    for cycle in find_parent_cycles(records.iter().copied()) {
        let Some(idx) = cycle.first().and_then(|id| position.get(id).copied()) else {
            continue;
        };
        if let Some(dropped) = parent[idx].take() {
            broken_links.push(BrokenLink {
                attendee: records[idx].id.clone(),
                parent: records[dropped].id.clone(),
            });
        }
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    let mut roots: Vec<usize> = Vec::new();
    for (idx, link) in parent.iter().enumerate() {
        match link {
            Some(p) => children[*p].push(idx),
            None => roots.push(idx),
        }
    }
    for list in &mut children {
        list.sort_by_key(|&i| (records[i].side, i));
    }

    let mut forest = Forest {
        broken_links,
        ..Forest::default()
    };
    for root in roots {
        let node = assemble(root, &records, &children);
        match node.side {
            Side::Bride => forest.bride.push(node),
            Side::Groom => forest.groom.push(node),
            Side::Common => forest.common.push(node),
        }
    }
    forest
}

fn assemble(idx: usize, records: &[&Attendee], children: &[Vec<usize>]) -> ForestNode {
    ForestNode {
        id: records[idx].id.clone(),
        side: records[idx].side,
        children: children[idx]
            .iter()
            .map(|&child| assemble(child, records, children))
            .collect(),
    }
}
