use std::collections::BTreeMap;
use std::fmt;

use seatwise_core::model::{AttendeeId, TableNumber};
use seatwise_core::{TablePlan, Version};

// ── Core result types ─────────────────────────────────────────────────────────

/// Outcome of one or more invariant checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleResult {
    /// `true` iff no violations were found.
    pub passed: bool,
    pub violations: Vec<InvariantViolation>,
}

impl OracleResult {
    fn pass() -> Self {
        Self {
            passed: true,
            violations: Vec::new(),
        }
    }

    fn from_violations(violations: Vec<InvariantViolation>) -> Self {
        Self {
            passed: violations.is_empty(),
            violations,
        }
    }

    /// Merge another result into this one (failures accumulate).
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        if !other.passed {
            self.passed = false;
            self.violations.extend(other.violations);
        }
        self
    }
}

// ── Invariant violation diagnostics ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A table holds more attendees than it has seats.
    Capacity {
        table: TableNumber,
        capacity: usize,
        occupied: usize,
    },

    /// One attendee appears in more than one assignment slot.
    DuplicateSeat {
        attendee: AttendeeId,
        tables: Vec<TableNumber>,
    },

    /// A seat is held by an id the graph no longer knows.
    OrphanSeat {
        attendee: AttendeeId,
        table: TableNumber,
    },

    /// The parent links contain a loop.
    Cycle { members: Vec<AttendeeId> },

    /// The rebuilt forest does not contain every record exactly once.
    NodeCount { records: usize, nodes: usize },

    /// A record names a parent that is not in the graph.
    DanglingParent {
        attendee: AttendeeId,
        parent: AttendeeId,
    },

    /// `seated + unseated_confirmed != confirmed_total`, or the capacity
    /// arithmetic does not add up.
    StatsIdentity { detail: String },

    /// `validate_layout` reported something.
    Layout { findings: Vec<String> },

    /// The plan version does not equal the number of committed writes.
    VersionDrift { expected: Version, actual: Version },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capacity {
                table,
                capacity,
                occupied,
            } => write!(f, "Capacity: table {table} holds {occupied} of {capacity} seats"),
            Self::DuplicateSeat { attendee, tables } => {
                write!(f, "DuplicateSeat: {attendee} seated at {tables:?}")
            }
            Self::OrphanSeat { attendee, table } => {
                write!(f, "OrphanSeat: unknown attendee {attendee} at table {table}")
            }
            Self::Cycle { members } => write!(f, "Cycle: parent links loop through {members:?}"),
            Self::NodeCount { records, nodes } => {
                write!(f, "NodeCount: {records} records but {nodes} forest nodes")
            }
            Self::DanglingParent { attendee, parent } => {
                write!(f, "DanglingParent: {attendee} points at missing {parent}")
            }
            Self::StatsIdentity { detail } => write!(f, "StatsIdentity: {detail}"),
            Self::Layout { findings } => write!(f, "Layout: {}", findings.join("; ")),
            Self::VersionDrift { expected, actual } => {
                write!(f, "VersionDrift: expected {expected}, plan is at {actual}")
            }
        }
    }
}

// ── Oracle ────────────────────────────────────────────────────────────────────

/// Invariant checks over a finished [`TablePlan`].
///
/// # Invariants checked
///
/// 1. **Capacity**: no table over capacity.
/// 2. **Seat uniqueness**: nobody holds two seats; every seat holder exists.
/// 3. **Acyclicity**: parent links never loop and never dangle.
/// 4. **Node count**: the forest contains every record.
/// 5. **Stats identity**: the seating statistics add up.
/// 6. **Layout**: `validate_layout` finds nothing.
pub struct PlanOracle;

impl PlanOracle {
    #[must_use]
    pub fn check_all(plan: &TablePlan) -> OracleResult {
        Self::check_capacity(plan)
            .merge(Self::check_seat_uniqueness(plan))
            .merge(Self::check_acyclic(plan))
            .merge(Self::check_node_count(plan))
            .merge(Self::check_stats(plan))
            .merge(Self::check_layout(plan))
    }

    #[must_use]
    pub fn check_capacity(plan: &TablePlan) -> OracleResult {
        let violations = plan
            .layout()
            .tables()
            .iter()
            .filter(|t| t.occupied() > t.capacity.seats())
            .map(|t| InvariantViolation::Capacity {
                table: t.number,
                capacity: t.capacity.seats(),
                occupied: t.occupied(),
            })
            .collect();
        OracleResult::from_violations(violations)
    }

    #[must_use]
    pub fn check_seat_uniqueness(plan: &TablePlan) -> OracleResult {
        let mut holders: BTreeMap<&AttendeeId, Vec<TableNumber>> = BTreeMap::new();
        let mut violations = Vec::new();

        for table in plan.layout().tables() {
            for attendee in table.assigned() {
                holders.entry(attendee).or_default().push(table.number);
                if !plan.attendees().contains(attendee) {
                    violations.push(InvariantViolation::OrphanSeat {
                        attendee: attendee.clone(),
                        table: table.number,
                    });
                }
            }
        }

        violations.extend(
            holders
                .into_iter()
                .filter(|(_, tables)| tables.len() > 1)
                .map(|(attendee, tables)| InvariantViolation::DuplicateSeat {
                    attendee: attendee.clone(),
                    tables,
                }),
        );
        OracleResult::from_violations(violations)
    }

    #[must_use]
    pub fn check_acyclic(plan: &TablePlan) -> OracleResult {
        let graph = plan.attendees();
        let mut violations: Vec<_> = graph
            .find_cycles()
            .into_iter()
            .map(|members| InvariantViolation::Cycle { members })
            .collect();

        for attendee in graph.iter() {
            match &attendee.parent_id {
                Some(parent) if !graph.contains(parent) => {
                    violations.push(InvariantViolation::DanglingParent {
                        attendee: attendee.id.clone(),
                        parent: parent.clone(),
                    });
                }
                _ => {}
            }
        }
        OracleResult::from_violations(violations)
    }

    #[must_use]
    pub fn check_node_count(plan: &TablePlan) -> OracleResult {
        let records = plan.attendees().len();
        let nodes = plan.forest().node_count();
        if records == nodes {
            OracleResult::pass()
        } else {
            OracleResult::from_violations(vec![InvariantViolation::NodeCount { records, nodes }])
        }
    }

    #[must_use]
    pub fn check_stats(plan: &TablePlan) -> OracleResult {
        let stats = plan.stats();
        let mut violations = Vec::new();

        if stats.seated + stats.unseated_confirmed != stats.confirmed_total {
            violations.push(InvariantViolation::StatsIdentity {
                detail: format!(
                    "seated {} + unseated {} != confirmed {}",
                    stats.seated, stats.unseated_confirmed, stats.confirmed_total
                ),
            });
        }
        if stats.occupied_seats + stats.capacity_remaining != stats.total_capacity {
            violations.push(InvariantViolation::StatsIdentity {
                detail: format!(
                    "occupied {} + remaining {} != capacity {}",
                    stats.occupied_seats, stats.capacity_remaining, stats.total_capacity
                ),
            });
        }
        if plan.stats() != stats {
            violations.push(InvariantViolation::StatsIdentity {
                detail: "recomputing statistics gave a different answer".to_string(),
            });
        }
        OracleResult::from_violations(violations)
    }

    #[must_use]
    pub fn check_layout(plan: &TablePlan) -> OracleResult {
        let findings: Vec<String> = plan.violations().iter().map(ToString::to_string).collect();
        if findings.is_empty() {
            OracleResult::pass()
        } else {
            OracleResult::from_violations(vec![InvariantViolation::Layout { findings }])
        }
    }

    /// The version must have advanced by exactly one per committed write.
    #[must_use]
    pub fn check_version_accounting(start: Version, committed: u64, plan: &TablePlan) -> OracleResult {
        let expected = Version::new(start.get().saturating_add(committed));
        let actual = plan.version();
        if expected == actual {
            OracleResult::pass()
        } else {
            OracleResult::from_violations(vec![InvariantViolation::VersionDrift { expected, actual }])
        }
    }
}
