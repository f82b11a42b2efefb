//! End-to-end planning scenarios through the public API.
//!
//! Each test walks one planner story: placing tables in a small hall,
//! filling a table to capacity, building a family tree, and removing a guest
//! who still has a seat and relatives.

use seatwise_core::coordinator::{on_attendee_removed, on_rsvp_changed, suggest_table_for_family};
use seatwise_core::error::ErrorCode;
use seatwise_core::graph::{FamilyGraph, GraphError, build_forest};
use seatwise_core::model::{Attendee, AttendeeId, Capacity, Category, Point, Shape, Side, Table, TableNumber};
use seatwise_core::seating::{
    Obstacle, SeatingError, VenueLayout, assign_seat, place_table, recompute_stats, unassign_seat,
    validate_layout,
};
use seatwise_core::{PlanError, TablePlan, Version};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn id(raw: &str) -> AttendeeId {
    AttendeeId::parse(raw).expect("valid id")
}

fn guest(raw: &str, side: Side) -> Attendee {
    Attendee::new(id(raw), raw, "Kowalski", side, Category::CloseFriend).confirmed(true)
}

fn round_table(number: u32, seats: u16, x: f64, y: f64) -> Table {
    Table::new(
        TableNumber(number),
        Shape::Round,
        Capacity::new(seats).expect("capacity"),
        Point::new(x, y).expect("point"),
    )
}

// ---------------------------------------------------------------------------
// Placement in a 10 x 10 hall
// ---------------------------------------------------------------------------

#[test]
fn placement_in_small_hall() {
    let mut layout = VenueLayout::new("hall", 10.0, 10.0).expect("layout");
    place_table(&mut layout, round_table(1, 8, 2.0, 2.0)).expect("first table fits");

    let err = place_table(&mut layout, round_table(2, 8, 2.0, 2.0)).expect_err("same spot");
    assert_eq!(
        err,
        SeatingError::Overlap {
            table: TableNumber(2),
            with: Obstacle::Table(TableNumber(1)),
        }
    );
    assert_eq!(err.code(), ErrorCode::TableOverlap);

    let err = place_table(&mut layout, round_table(2, 8, 8.0, 8.0)).expect_err("corner");
    assert!(matches!(err, SeatingError::Bounds { table: TableNumber(2), .. }));
    assert_eq!(err.code(), ErrorCode::OutOfBounds);

    place_table(&mut layout, round_table(2, 8, 6.0, 6.0)).expect("diagonal neighbour fits");
    assert_eq!(layout.total_capacity(), 16);
    assert!(validate_layout(&layout, &Vec::<Attendee>::new()).is_empty());
}

// ---------------------------------------------------------------------------
// Capacity
// ---------------------------------------------------------------------------

#[test]
fn capacity_two_table_fills_and_frees() {
    let mut layout = VenueLayout::new("hall", 10.0, 10.0).expect("layout");
    place_table(&mut layout, round_table(1, 2, 2.0, 2.0)).expect("place");
    let people = vec![
        guest("anna", Side::Bride),
        guest("bartek", Side::Groom),
        guest("celina", Side::Common),
    ];

    assign_seat(&mut layout, &people, &id("anna"), TableNumber(1)).expect("A");
    assign_seat(&mut layout, &people, &id("bartek"), TableNumber(1)).expect("B");
    let err = assign_seat(&mut layout, &people, &id("celina"), TableNumber(1)).expect_err("full");
    assert!(matches!(err, SeatingError::CapacityExceeded { table: TableNumber(1), .. }));

    assert_eq!(unassign_seat(&mut layout, &id("anna")), Some(TableNumber(1)));
    assign_seat(&mut layout, &people, &id("celina"), TableNumber(1)).expect("C after A left");

    let table = layout.table(TableNumber(1)).expect("table");
    assert_eq!(table.assigned(), &[id("bartek"), id("celina")]);

    let stats = recompute_stats(&layout, &people);
    assert_eq!(stats.confirmed_total, 3);
    assert_eq!(stats.seated, 2);
    assert_eq!(stats.unseated_confirmed, 1);
    assert_eq!(stats.capacity_remaining, 0);
}

// ---------------------------------------------------------------------------
// Relationship graph
// ---------------------------------------------------------------------------

#[test]
fn reverse_link_is_a_cycle() {
    let mut graph = FamilyGraph::from_attendees(vec![
        guest("y", Side::Bride),
        guest("x", Side::Bride).with_parent(id("y")),
    ])
    .expect("graph");

    let err = graph.attach(&id("y"), &id("x")).expect_err("cycle");
    assert_eq!(
        err,
        GraphError::Cycle {
            child: id("y"),
            parent: id("x"),
        }
    );
    assert_eq!(err.code(), ErrorCode::CycleDetected);
    assert_eq!(graph.get(&id("y")).and_then(|a| a.parent_id.clone()), None);
}

#[test]
fn forest_splits_by_side_and_orders_children() {
    let people = vec![
        guest("bride-mum", Side::Bride),
        guest("groom-dad", Side::Groom),
        guest("friend", Side::Common),
        guest("cousin-g", Side::Groom).with_parent(id("bride-mum")),
        guest("cousin-b", Side::Bride).with_parent(id("bride-mum")),
        guest("dangling", Side::Groom).with_parent(id("unknown")),
    ];
    let forest = build_forest(&people);

    assert_eq!(forest.node_count(), people.len());
    let groom_roots: Vec<_> = forest.roots(Side::Groom).iter().map(|n| n.id.as_str()).collect();
    assert_eq!(groom_roots, vec!["groom-dad", "dangling"]);
    let mum = forest.find(&id("bride-mum")).expect("mum");
    let kids: Vec<_> = mum.children.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(kids, vec!["cousin-b", "cousin-g"]);
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

fn family_plan() -> TablePlan {
    let graph = FamilyGraph::from_attendees(vec![
        guest("babcia", Side::Bride),
        guest("mama", Side::Bride).with_parent(id("babcia")),
        guest("ciocia", Side::Bride).with_parent(id("babcia")),
        guest("ola", Side::Bride).with_parent(id("mama")),
    ])
    .expect("graph");
    let layout = VenueLayout::new("dwór", 20.0, 10.0).expect("layout");
    let mut plan = TablePlan::new(layout, graph);
    let v = plan.place_table(plan.version(), round_table(1, 6, 1.0, 1.0)).expect("t1");
    plan.place_table(v, round_table(2, 6, 6.0, 1.0)).expect("t2");
    plan
}

#[test]
fn removing_a_seated_parent_cleans_everything() {
    let mut plan = family_plan();
    let v = plan.assign_seat(plan.version(), &id("mama"), TableNumber(1)).expect("seat");
    let (v, removal) = on_attendee_removed(&mut plan, v, &id("mama")).expect("remove");

    assert_eq!(removal.promoted, vec![id("ola")]);
    assert_eq!(plan.version(), v);
    assert_eq!(plan.seat_of(&id("mama")), None);

    let forest = plan.forest();
    assert!(forest.find(&id("mama")).is_none());
    assert!(forest.is_root(&id("ola")));
    assert_eq!(forest.node_count(), 3);
    assert!(plan
        .attendees()
        .iter()
        .all(|a| a.parent_id.as_ref() != Some(&id("mama"))));
    assert!(plan.violations().is_empty());
}

#[test]
fn sibling_table_is_suggested_then_rsvp_updates_stats() {
    let mut plan = family_plan();
    let v = plan.assign_seat(plan.version(), &id("ciocia"), TableNumber(2)).expect("seat");
    assert_eq!(suggest_table_for_family(&plan, &id("mama")), Some(TableNumber(2)));

    let (_, stats) = on_rsvp_changed(&mut plan, v, &id("ola"), false).expect("rsvp");
    assert_eq!(stats.confirmed_total, 3);
    assert_eq!(stats.seated + stats.unseated_confirmed, stats.confirmed_total);
}

// ---------------------------------------------------------------------------
// Optimistic concurrency on a single plan
// ---------------------------------------------------------------------------

#[test]
fn second_caller_with_first_version_is_stale() {
    let mut plan = family_plan();
    let read_by_both = plan.version();

    let v2 = plan
        .assign_seat(read_by_both, &id("ola"), TableNumber(1))
        .expect("caller one");
    assert_eq!(v2, read_by_both.next());

    let err = plan
        .assign_seat(read_by_both, &id("mama"), TableNumber(1))
        .expect_err("caller two");
    assert_eq!(
        err,
        PlanError::StaleVersion {
            expected: read_by_both,
            current: v2,
        }
    );
    assert_eq!(err.code(), ErrorCode::StaleVersion);
    assert_eq!(plan.seat_of(&id("mama")), None);
    assert_ne!(v2, Version::INITIAL);
}
