//! Upward and downward traversal of the relationship graph.
//!
//! - [`Ancestors`]: lazy walk from an attendee's parent up to its root.
//! - [`FamilyGraph::subtree_ids`]: BFS over descendants, root first.
//! - [`FamilyGraph::siblings_of`] and [`FamilyGraph::breadcrumb`].
//!
//! Every walk is guarded against loops so that a graph deserialized from
//! untrusted data still terminates.

#![allow(clippy::module_name_repetitions)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::iter::FusedIterator;

use super::{FamilyGraph, GraphError};
use crate::model::{Attendee, AttendeeId};

// ---------------------------------------------------------------------------
// Ancestors
// ---------------------------------------------------------------------------

/// Iterator over an attendee's ancestors, immediate parent first.
///
/// Cloning yields an independent iterator positioned at the same step. The
/// walk stops at a root, at a dangling parent id, or at the first id it has
/// already visited (the starting attendee counts as visited), so each
/// ancestor is yielded at most once even on looped records.
#[derive(Debug, Clone)]
pub struct Ancestors<'g> {
    graph: &'g FamilyGraph,
    next: Option<&'g AttendeeId>,
    visited: HashSet<&'g AttendeeId>,
    budget: usize,
}

impl<'g> Ancestors<'g> {
    pub(crate) fn new(graph: &'g FamilyGraph, origin: &'g Attendee) -> Self {
        Self {
            graph,
            next: origin.parent_id.as_ref(),
            visited: HashSet::from([&origin.id]),
            budget: graph.len(),
        }
    }
}

impl<'g> Iterator for Ancestors<'g> {
    type Item = &'g AttendeeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        if self.budget == 0 || !self.visited.insert(id) {
            return None;
        }
        let parent = self.graph.get(id)?;
        self.budget -= 1;
        self.next = parent.parent_id.as_ref();
        Some(&parent.id)
    }
}

impl FusedIterator for Ancestors<'_> {}

// ---------------------------------------------------------------------------
// Downward traversal
// ---------------------------------------------------------------------------

impl FamilyGraph {
    /// Direct children of `id`, bride side first, then groom, then common,
    /// insertion order within a side.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if `id` is unknown.
    pub fn children_of(&self, id: &AttendeeId) -> Result<Vec<&AttendeeId>, GraphError> {
        self.require(id)?;
        let mut children: Vec<&Attendee> = self
            .iter()
            .filter(|a| a.parent_id.as_ref() == Some(id) && &a.id != id)
            .collect();
        children.sort_by_key(|a| a.side);
        Ok(children.into_iter().map(|a| &a.id).collect())
    }

    /// Ids of `root` and all of its descendants in breadth-first order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if `root` is unknown.
    pub fn subtree_ids(&self, root: &AttendeeId) -> Result<Vec<AttendeeId>, GraphError> {
        self.require(root)?;

        let mut index: HashMap<&AttendeeId, Vec<&AttendeeId>> = HashMap::new();
        for attendee in self.iter() {
            if let Some(parent) = attendee.parent_id.as_ref() {
                index.entry(parent).or_default().push(&attendee.id);
            }
        }

        let mut visited: HashSet<&AttendeeId> = HashSet::new();
        let mut queue: VecDeque<&AttendeeId> = VecDeque::new();
        let mut result = Vec::new();
        queue.push_back(root);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            result.push(current.clone());
            if let Some(children) = index.get(current) {
                queue.extend(children.iter().copied().filter(|c| !visited.contains(c)));
            }
        }
        Ok(result)
    }

    /// Attendees sharing `id`'s parent, excluding `id`. Roots have no
    /// siblings.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if `id` is unknown.
    pub fn siblings_of(&self, id: &AttendeeId) -> Result<Vec<&AttendeeId>, GraphError> {
        let attendee = self.require(id)?;
        let Some(parent) = attendee.parent_id.as_ref().filter(|p| self.contains(p)) else {
            return Ok(Vec::new());
        };
        let mut siblings = self.children_of(parent)?;
        siblings.retain(|s| *s != id);
        Ok(siblings)
    }

    /// Display names from the root down to `id`, e.g.
    /// `["Anna Kowalska", "Piotr Kowalski", "Ola Kowalska"]`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotFound`] if `id` is unknown.
    pub fn breadcrumb(&self, id: &AttendeeId) -> Result<Vec<String>, GraphError> {
        let attendee = self.require(id)?;
        let mut trail: Vec<String> = self
            .ancestors_of(id)?
            .filter_map(|a| self.get(a))
            .map(Attendee::display_name)
            .collect();
        trail.reverse();
        trail.push(attendee.display_name());
        Ok(trail)
    }

    fn require(&self, id: &AttendeeId) -> Result<&Attendee, GraphError> {
        self.get(id).ok_or_else(|| GraphError::NotFound(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Side};

    fn id(raw: &str) -> AttendeeId {
        AttendeeId::new_unchecked(raw)
    }

    fn person(raw: &str, side: Side, parent: Option<&str>) -> Attendee {
        let a = Attendee::new(id(raw), raw, "Nowak", side, Category::CloseFamily);
        match parent {
            Some(p) => a.with_parent(id(p)),
            None => a,
        }
    }

    /// grandma -> {mum, uncle}; mum -> {kid-g, kid-b}; uncle -> cousin.
    fn family() -> FamilyGraph {
        FamilyGraph::from_attendees(vec![
            person("grandma", Side::Bride, None),
            person("mum", Side::Bride, Some("grandma")),
            person("uncle", Side::Bride, Some("grandma")),
            person("kid-g", Side::Groom, Some("mum")),
            person("kid-b", Side::Bride, Some("mum")),
            person("cousin", Side::Common, Some("uncle")),
        ])
        .expect("valid family")
    }

    fn strs<'a>(ids: impl IntoIterator<Item = &'a AttendeeId>) -> Vec<&'a str> {
        ids.into_iter().map(AttendeeId::as_str).collect()
    }

    // -----------------------------------------------------------------------
    // Ancestors
    // -----------------------------------------------------------------------

    #[test]
    fn ancestors_of_root_is_empty() {
        let g = family();
        assert_eq!(g.ancestors_of(&id("grandma")).expect("known").count(), 0);
    }

    #[test]
    fn ancestors_walk_to_root() {
        let g = family();
        let chain = g.ancestors_of(&id("kid-b")).expect("known");
        assert_eq!(strs(chain), vec!["mum", "grandma"]);
    }

    #[test]
    fn ancestors_clone_restarts_from_same_step() {
        let g = family();
        let mut walk = g.ancestors_of(&id("cousin")).expect("known");
        assert_eq!(walk.next().map(AttendeeId::as_str), Some("uncle"));
        let fork = walk.clone();
        assert_eq!(strs(walk), vec!["grandma"]);
        assert_eq!(strs(fork), vec!["grandma"]);
    }

    #[test]
    fn ancestors_of_unknown_is_not_found() {
        let g = family();
        assert_eq!(
            g.ancestors_of(&id("ghost")).err(),
            Some(GraphError::NotFound(id("ghost")))
        );
    }

    #[test]
    fn ancestors_terminate_on_looped_records() {
        let g: FamilyGraph = serde_json::from_value(serde_json::json!([
            {"id": "a", "first_name": "A", "last_name": "X", "category": "other",
             "side": "common", "parent_id": "b"},
            {"id": "b", "first_name": "B", "last_name": "X", "category": "other",
             "side": "common", "parent_id": "a"}
        ]))
        .expect("records deserialize");
        assert_eq!(strs(g.ancestors_of(&id("a")).expect("known")), vec!["b"]);
    }

    #[test]
    fn ancestors_stop_when_entering_a_loop_above_the_origin() {
        // kid -> a -> b -> c -> a
        let g: FamilyGraph = serde_json::from_value(serde_json::json!([
            {"id": "a", "first_name": "A", "last_name": "X", "category": "other",
             "side": "common", "parent_id": "b"},
            {"id": "b", "first_name": "B", "last_name": "X", "category": "other",
             "side": "common", "parent_id": "c"},
            {"id": "c", "first_name": "C", "last_name": "X", "category": "other",
             "side": "common", "parent_id": "a"},
            {"id": "kid", "first_name": "Kid", "last_name": "X", "category": "other",
             "side": "common", "parent_id": "a"}
        ]))
        .expect("records deserialize");
        assert_eq!(
            strs(g.ancestors_of(&id("kid")).expect("known")),
            vec!["a", "b", "c"]
        );
        assert_eq!(
            g.breadcrumb(&id("kid")).expect("known"),
            vec!["C X", "B X", "A X", "Kid X"]
        );
    }

    // -----------------------------------------------------------------------
    // Downward traversal
    // -----------------------------------------------------------------------

    #[test]
    fn children_are_side_ordered() {
        let g = family();
        assert_eq!(strs(g.children_of(&id("mum")).expect("known")), vec!["kid-b", "kid-g"]);
    }

    #[test]
    fn subtree_is_breadth_first_root_first() {
        let g = family();
        let ids = g.subtree_ids(&id("grandma")).expect("known");
        assert_eq!(
            strs(&ids),
            vec!["grandma", "mum", "uncle", "kid-g", "kid-b", "cousin"]
        );
    }

    #[test]
    fn subtree_of_leaf_is_itself() {
        let g = family();
        assert_eq!(strs(&g.subtree_ids(&id("cousin")).expect("known")), vec!["cousin"]);
    }

    #[test]
    fn siblings_exclude_self() {
        let g = family();
        assert_eq!(strs(g.siblings_of(&id("kid-g")).expect("known")), vec!["kid-b"]);
        assert!(g.siblings_of(&id("grandma")).expect("known").is_empty());
    }

    #[test]
    fn breadcrumb_runs_root_to_leaf() {
        let g = family();
        assert_eq!(
            g.breadcrumb(&id("cousin")).expect("known"),
            vec!["grandma Nowak", "uncle Nowak", "cousin Nowak"]
        );
    }
}
