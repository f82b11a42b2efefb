//! Operations that span the relationship graph and the seating layout.
//!
//! # Overview
//!
//! The graph and the allocator never call each other. When one state change
//! has to reach both, it goes through here:
//!
//! - [`suggest_table_for_family`]: advisory co-location hint.
//! - [`can_family_share_table`]: capacity check for a whole family group.
//! - [`on_attendee_removed`]: graph removal plus seat release, atomically.
//! - [`on_rsvp_changed`]: RSVP update plus fresh statistics.

use std::collections::HashSet;

use tracing::debug;

use crate::error::PlanError;
use crate::graph::Removal;
use crate::model::{AttendeeId, TableNumber};
use crate::plan::{TablePlan, Version};
use crate::seating::{SeatingStats, unassign_seat};

// ---------------------------------------------------------------------------
// Suggestions
// ---------------------------------------------------------------------------

/// Suggest a table that keeps `attendee` near their family.
///
/// Candidates are the tables already hosting the attendee's siblings; for a
/// root, its own children stand in for siblings. When none of them is
/// seated and the plan's `suggest_from_kin` switch is on, tables hosting the
/// attendee's parent or children are considered instead. Among candidates
/// that can still fit the attendee, the one with the most free seats wins
/// and ties go to the lowest table number.
///
/// Returns `None` for unknown attendees or when nothing fits. The result is
/// a hint only; nothing is assigned.
#[must_use]
pub fn suggest_table_for_family(plan: &TablePlan, attendee: &AttendeeId) -> Option<TableNumber> {
    let graph = plan.attendees();
    let record = graph.get(attendee)?;
    let parent = record.parent_id.as_ref().filter(|p| graph.contains(p));

    let primary: Vec<&AttendeeId> = match parent {
        Some(_) => graph.siblings_of(attendee).ok()?,
        None => graph.children_of(attendee).ok()?,
    };
    if let Some(table) = best_fit(plan, attendee, primary) {
        return Some(table);
    }
    if !plan.planning().suggest_from_kin {
        return None;
    }

    let mut kin: Vec<&AttendeeId> = parent.into_iter().collect();
    if parent.is_some() {
        kin.extend(graph.children_of(attendee).ok()?);
    }
    best_fit(plan, attendee, kin)
}

fn best_fit<'a, I>(plan: &TablePlan, attendee: &AttendeeId, relatives: I) -> Option<TableNumber>
where
    I: IntoIterator<Item = &'a AttendeeId>,
{
    let layout = plan.layout();
    let hosting: HashSet<TableNumber> = relatives
        .into_iter()
        .filter_map(|r| layout.seat_of(r))
        .collect();

    layout
        .tables()
        .iter()
        .filter(|t| hosting.contains(&t.number))
        .filter(|t| t.seats(attendee) || !t.is_full())
        .max_by(|a, b| {
            a.free_seats()
                .cmp(&b.free_seats())
                .then_with(|| b.number.cmp(&a.number))
        })
        .map(|t| t.number)
}

/// `true` if every unseated member of the family rooted at `root` fits in
/// the free seats of table `number`. Unknown ids answer `false`.
#[must_use]
pub fn can_family_share_table(plan: &TablePlan, root: &AttendeeId, number: TableNumber) -> bool {
    let layout = plan.layout();
    let Some(table) = layout.table(number) else {
        return false;
    };
    let Ok(members) = plan.attendees().subtree_ids(root) else {
        return false;
    };
    let unseated = members
        .iter()
        .filter(|m| layout.seat_of(m).is_none())
        .count();
    unseated <= table.free_seats()
}

// ---------------------------------------------------------------------------
// Fan-out
// ---------------------------------------------------------------------------

/// Remove an attendee from the graph and release their seat as one step.
///
/// Both changes are made on working copies and published together, so a
/// failure leaves the plan exactly as it was.
///
/// # Errors
///
/// [`PlanError::StaleVersion`] or `NotFound` for an unknown id.
pub fn on_attendee_removed(
    plan: &mut TablePlan,
    expected: Version,
    id: &AttendeeId,
) -> Result<(Version, Removal), PlanError> {
    plan.ensure_version(expected)?;

    let mut graph = plan.attendees().clone();
    let mut layout = plan.layout().clone();
    let removal = graph.remove_attendee(id)?;
    let released = unassign_seat(&mut layout, id);

    debug!(
        attendee = %id,
        promoted = removal.promoted.len(),
        released = ?released,
        "attendee removal fanned out"
    );
    plan.replace_parts(layout, graph);
    Ok((plan.commit_graph(), removal))
}

/// Record an RSVP change and return statistics computed after it.
///
/// # Errors
///
/// [`PlanError::StaleVersion`] or `NotFound` for an unknown id.
pub fn on_rsvp_changed(
    plan: &mut TablePlan,
    expected: Version,
    id: &AttendeeId,
    confirmed: bool,
) -> Result<(Version, SeatingStats), PlanError> {
    plan.ensure_version(expected)?;
    let (_, graph) = plan.parts_mut();
    let changed = graph.set_confirmed(id, confirmed)?;
    debug!(attendee = %id, confirmed, changed, "rsvp updated");
    let version = plan.commit_graph();
    Ok((version, plan.stats()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineConfig, PlanningConfig};
    use crate::graph::FamilyGraph;
    use crate::model::{Attendee, Capacity, Category, Point, Shape, Side, Table};
    use crate::seating::VenueLayout;

    fn id(raw: &str) -> AttendeeId {
        AttendeeId::new_unchecked(raw)
    }

    fn person(raw: &str, parent: Option<&str>) -> Attendee {
        let a = Attendee::new(id(raw), raw, "Wiśniewski", Side::Bride, Category::CloseFamily)
            .confirmed(true);
        match parent {
            Some(p) => a.with_parent(id(p)),
            None => a,
        }
    }

    /// mum -> {kid1, kid2, kid3}; aunt -> cousin; loner.
    /// Tables 1..=3 with 4, 6 and 6 seats.
    fn plan_with(planning: PlanningConfig) -> TablePlan {
        let graph = FamilyGraph::from_attendees(vec![
            person("mum", None),
            person("kid1", Some("mum")),
            person("kid2", Some("mum")),
            person("kid3", Some("mum")),
            person("aunt", None),
            person("cousin", Some("aunt")),
            person("loner", None),
        ])
        .expect("graph");
        let layout = VenueLayout::new("hall", 30.0, 10.0).expect("layout");
        let config = EngineConfig {
            planning,
            ..EngineConfig::default()
        };
        let mut plan = TablePlan::new(layout, graph)
            .with_config(&config)
            .expect("config");
        let mut v = plan.version();
        for (n, seats, x) in [(1, 4, 1.0), (2, 6, 6.0), (3, 6, 11.0)] {
            let table = Table::new(
                TableNumber(n),
                Shape::Round,
                Capacity::new(seats).expect("capacity"),
                Point::new(x, 2.0).expect("point"),
            );
            v = plan.place_table(v, table).expect("place");
        }
        plan
    }

    fn plan() -> TablePlan {
        plan_with(PlanningConfig::default())
    }

    fn seat(plan: &mut TablePlan, raw: &str, table: u32) {
        plan.assign_seat(plan.version(), &id(raw), TableNumber(table))
            .expect("seat");
    }

    // -----------------------------------------------------------------------
    // suggest_table_for_family
    // -----------------------------------------------------------------------

    #[test]
    fn suggests_table_of_sibling_with_most_free_seats() {
        let mut p = plan();
        seat(&mut p, "kid1", 1);
        seat(&mut p, "kid2", 2);
        assert_eq!(suggest_table_for_family(&p, &id("kid3")), Some(TableNumber(2)));
    }

    #[test]
    fn ties_go_to_lowest_number() {
        let mut p = plan();
        seat(&mut p, "kid1", 3);
        seat(&mut p, "kid2", 2);
        assert_eq!(suggest_table_for_family(&p, &id("kid3")), Some(TableNumber(2)));
    }

    #[test]
    fn full_tables_are_skipped() {
        let mut p = plan();
        seat(&mut p, "kid1", 1);
        for raw in ["aunt", "cousin", "loner"] {
            seat(&mut p, raw, 1);
        }
        assert_eq!(suggest_table_for_family(&p, &id("kid2")), None);
    }

    #[test]
    fn root_uses_own_children() {
        let mut p = plan();
        seat(&mut p, "kid2", 3);
        assert_eq!(suggest_table_for_family(&p, &id("mum")), Some(TableNumber(3)));
    }

    #[test]
    fn falls_back_to_parent_when_enabled() {
        let mut p = plan();
        seat(&mut p, "aunt", 2);
        assert_eq!(suggest_table_for_family(&p, &id("cousin")), Some(TableNumber(2)));

        let mut strict = plan_with(PlanningConfig {
            suggest_from_kin: false,
            ..PlanningConfig::default()
        });
        seat(&mut strict, "aunt", 2);
        assert_eq!(suggest_table_for_family(&strict, &id("cousin")), None);
    }

    #[test]
    fn no_family_no_suggestion() {
        let p = plan();
        assert_eq!(suggest_table_for_family(&p, &id("loner")), None);
        assert_eq!(suggest_table_for_family(&p, &id("ghost")), None);
    }

    // -----------------------------------------------------------------------
    // can_family_share_table
    // -----------------------------------------------------------------------

    #[test]
    fn family_fits_when_unseated_members_fit() {
        let mut p = plan();
        assert!(can_family_share_table(&p, &id("mum"), TableNumber(1)));
        seat(&mut p, "loner", 1);
        assert!(!can_family_share_table(&p, &id("mum"), TableNumber(1)));
        seat(&mut p, "kid1", 2);
        assert!(can_family_share_table(&p, &id("mum"), TableNumber(1)));
        assert!(!can_family_share_table(&p, &id("mum"), TableNumber(99)));
    }

    // -----------------------------------------------------------------------
    // Fan-out
    // -----------------------------------------------------------------------

    #[test]
    fn removal_releases_seat_and_promotes_children() {
        let mut p = plan();
        seat(&mut p, "mum", 2);
        let current = p.version();
        let (v, removal) = on_attendee_removed(&mut p, current, &id("mum")).expect("remove");
        assert_eq!(v, p.version());
        assert_eq!(removal.promoted, vec![id("kid1"), id("kid2"), id("kid3")]);
        assert_eq!(p.seat_of(&id("mum")), None);
        assert!(p.forest().find(&id("mum")).is_none());
        assert!(p.forest().is_root(&id("kid1")));
        assert!(p.violations().is_empty());
    }

    #[test]
    fn removal_from_a_loaded_plan_clears_the_seat() {
        let mut stored = plan();
        seat(&mut stored, "cousin", 3);
        seat(&mut stored, "aunt", 3);
        let json = serde_json::to_string(&stored).expect("serialize");

        let mut p: TablePlan = serde_json::from_str(&json).expect("deserialize");
        let current = p.version();
        on_attendee_removed(&mut p, current, &id("cousin")).expect("remove");
        assert_eq!(p.seat_of(&id("cousin")), None);
        assert_eq!(p.seat_of(&id("aunt")), Some(TableNumber(3)));
        assert!(p.violations().is_empty());
    }

    #[test]
    fn failed_removal_changes_nothing() {
        let mut p = plan();
        seat(&mut p, "mum", 2);
        let before = p.clone();
        let current = p.version();
        assert!(on_attendee_removed(&mut p, current, &id("ghost")).is_err());
        let stale = Version::new(1);
        assert!(on_attendee_removed(&mut p, stale, &id("mum"))
            .expect_err("stale")
            .is_stale());
        assert_eq!(p, before);
    }

    #[test]
    fn rsvp_change_returns_fresh_stats() {
        let mut p = plan();
        seat(&mut p, "kid1", 1);
        let before = p.stats();
        let current = p.version();
        let (_, after) = on_rsvp_changed(&mut p, current, &id("kid1"), false).expect("rsvp");
        assert_eq!(after.confirmed_total, before.confirmed_total - 1);
        assert_eq!(after.seated, before.seated - 1);
        assert_eq!(after.seated_unconfirmed, 1);
        assert_eq!(after, p.stats());
    }
}
