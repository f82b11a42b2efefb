//! Cycle detection over raw `parent_id` links.
//!
//! Records that arrive from the profile store were not necessarily written
//! through the engine, so their parent links may loop. Each attendee has at
//! most one parent, which makes every strongly connected component with more
//! than one member a single simple cycle; a self-reference shows up as a
//! one-member component with a self-loop.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::model::{Attendee, AttendeeId};

/// Find every parent-link cycle in `attendees`.
///
/// Each cycle lists its members in input order; cycles themselves are
/// ordered by their earliest member. Links to ids absent from the input are
/// ignored, as are repeated ids after their first occurrence.
#[must_use]
pub fn find_parent_cycles<'a, I>(attendees: I) -> Vec<Vec<AttendeeId>>
where
    I: IntoIterator<Item = &'a Attendee>,
{
    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let mut index: HashMap<&AttendeeId, NodeIndex> = HashMap::new();
    let mut records: Vec<&Attendee> = Vec::new();

    for attendee in attendees {
        if index.contains_key(&attendee.id) {
            continue;
        }
        let node = graph.add_node(records.len());
        index.insert(&attendee.id, node);
        records.push(attendee);
    }

    for attendee in &records {
        let Some(parent) = attendee.parent_id.as_ref() else {
            continue;
        };
        if let (Some(&from), Some(&to)) = (index.get(&attendee.id), index.get(parent)) {
            graph.add_edge(from, to, ());
        }
    }

    let mut cycles: Vec<Vec<usize>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1
                || component
                    .first()
                    .is_some_and(|node| graph.find_edge(*node, *node).is_some())
        })
        .map(|component| {
            let mut positions: Vec<usize> = component
                .into_iter()
                .filter_map(|node| graph.node_weight(node).copied())
                .collect();
            positions.sort_unstable();
            positions
        })
        .collect();

    cycles.sort_unstable();
    cycles
        .into_iter()
        .map(|positions| {
            positions
                .into_iter()
                .map(|pos| records[pos].id.clone())
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Side};

    fn person(id: &str, parent: Option<&str>) -> Attendee {
        let a = Attendee::new(
            AttendeeId::new_unchecked(id),
            id,
            "Test",
            Side::Common,
            Category::Other,
        );
        match parent {
            Some(p) => a.with_parent(AttendeeId::new_unchecked(p)),
            None => a,
        }
    }

    fn ids(raw: &[&str]) -> Vec<AttendeeId> {
        raw.iter().map(|s| AttendeeId::new_unchecked(*s)).collect()
    }

    #[test]
    fn acyclic_input_has_no_cycles() {
        let people = vec![
            person("a", None),
            person("b", Some("a")),
            person("c", Some("b")),
        ];
        assert!(find_parent_cycles(&people).is_empty());
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let people = vec![person("a", Some("a"))];
        assert_eq!(find_parent_cycles(&people), vec![ids(&["a"])]);
    }

    #[test]
    fn three_cycle_members_in_input_order() {
        let people = vec![
            person("x", None),
            person("c", Some("b")),
            person("a", Some("c")),
            person("b", Some("a")),
        ];
        assert_eq!(find_parent_cycles(&people), vec![ids(&["c", "a", "b"])]);
    }

    #[test]
    fn dangling_parent_is_not_a_cycle() {
        let people = vec![person("a", Some("ghost"))];
        assert!(find_parent_cycles(&people).is_empty());
    }

    #[test]
    fn separate_cycles_are_reported_separately() {
        let people = vec![
            person("a", Some("b")),
            person("b", Some("a")),
            person("c", Some("d")),
            person("d", Some("c")),
            person("e", Some("a")),
        ];
        let cycles = find_parent_cycles(&people);
        assert_eq!(cycles, vec![ids(&["a", "b"]), ids(&["c", "d"])]);
    }
}
