//! Whole-layout validation.
//!
//! [`validate_layout`] re-checks every rule the allocator enforces and
//! reports all breaches at once instead of stopping at the first. It is
//! meant for layouts that did not arrive through the allocator, such as a
//! plan loaded from storage, and as an oracle in tests.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::VenueLayout;
use crate::error::ErrorCode;
use crate::model::{AttendeeDirectory, AttendeeId, Capacity, TableNumber, ZoneKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    TableOverlap {
        table: TableNumber,
        other: TableNumber,
    },
    ZoneOverlap {
        table: TableNumber,
        zone: ZoneKind,
    },
    OutOfBounds {
        table: TableNumber,
    },
    DuplicateNumber {
        table: TableNumber,
        count: usize,
    },
    CapacityExceeded {
        table: TableNumber,
        capacity: Capacity,
        occupied: usize,
    },
    UnknownAttendee {
        table: TableNumber,
        attendee: AttendeeId,
    },
    DuplicateSeat {
        attendee: AttendeeId,
        tables: Vec<TableNumber>,
    },
}

impl Violation {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::TableOverlap { .. } | Self::ZoneOverlap { .. } => ErrorCode::TableOverlap,
            Self::OutOfBounds { .. } => ErrorCode::OutOfBounds,
            Self::DuplicateNumber { .. } => ErrorCode::DuplicateTableNumber,
            Self::CapacityExceeded { .. } => ErrorCode::CapacityExceeded,
            Self::UnknownAttendee { .. } => ErrorCode::AttendeeNotFound,
            Self::DuplicateSeat { .. } => ErrorCode::AlreadySeated,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TableOverlap { table, other } => write!(f, "table {table} overlaps table {other}"),
            Self::ZoneOverlap { table, zone } => write!(f, "table {table} overlaps the {zone} zone"),
            Self::OutOfBounds { table } => write!(f, "table {table} extends beyond the venue"),
            Self::DuplicateNumber { table, count } => {
                write!(f, "table number {table} is used {count} times")
            }
            Self::CapacityExceeded {
                table,
                capacity,
                occupied,
            } => write!(f, "table {table} seats {occupied} but has {capacity} seats"),
            Self::UnknownAttendee { table, attendee } => {
                write!(f, "table {table} seats unknown attendee '{attendee}'")
            }
            Self::DuplicateSeat { attendee, tables } => {
                let list: Vec<String> = tables.iter().map(ToString::to_string).collect();
                write!(f, "attendee '{attendee}' is seated at {}", list.join(", "))
            }
        }
    }
}

/// Collect every rule breach in `layout`.
///
/// Violations are reported in a fixed order: table/table overlaps, then
/// table/zone overlaps, then out-of-bounds tables, duplicate numbers,
/// over-capacity tables, assignments to unknown attendees and finally
/// attendees seated more than once. An empty result means the layout is
/// sound.
pub fn validate_layout<D>(layout: &VenueLayout, directory: &D) -> Vec<Violation>
where
    D: AttendeeDirectory + ?Sized,
{
    let mut violations = Vec::new();
    let tables = layout.tables();
    let footprints: Vec<_> = tables.iter().map(|t| layout.footprint(t)).collect();

    for (i, a) in footprints.iter().enumerate() {
        for (j, b) in footprints.iter().enumerate().skip(i + 1) {
            if a.intersects(b) {
                violations.push(Violation::TableOverlap {
                    table: tables[i].number,
                    other: tables[j].number,
                });
            }
        }
    }

    for (table, claimed) in tables.iter().zip(&footprints) {
        for zone in layout.zones() {
            if zone.area().intersects(claimed) {
                violations.push(Violation::ZoneOverlap {
                    table: table.number,
                    zone: zone.kind,
                });
            }
        }
    }

    for (table, claimed) in tables.iter().zip(&footprints) {
        if !claimed.within(layout.width(), layout.height()) {
            violations.push(Violation::OutOfBounds {
                table: table.number,
            });
        }
    }

    let mut numbers: BTreeMap<TableNumber, usize> = BTreeMap::new();
    for table in tables {
        *numbers.entry(table.number).or_default() += 1;
    }
    violations.extend(
        numbers
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(table, count)| Violation::DuplicateNumber { table, count }),
    );

    for table in tables {
        if table.occupied() > table.capacity.seats() {
            violations.push(Violation::CapacityExceeded {
                table: table.number,
                capacity: table.capacity,
                occupied: table.occupied(),
            });
        }
    }

    for table in tables {
        for attendee in table.assigned() {
            if !directory.contains_attendee(attendee) {
                violations.push(Violation::UnknownAttendee {
                    table: table.number,
                    attendee: attendee.clone(),
                });
            }
        }
    }

    let mut seats: HashMap<&AttendeeId, Vec<TableNumber>> = HashMap::new();
    let mut first_seen: Vec<&AttendeeId> = Vec::new();
    for table in tables {
        for attendee in table.assigned() {
            let held = seats.entry(attendee).or_default();
            if held.is_empty() {
                first_seen.push(attendee);
            }
            held.push(table.number);
        }
    }
    for attendee in first_seen {
        if let Some(held) = seats.remove(attendee) {
            if held.len() > 1 {
                violations.push(Violation::DuplicateSeat {
                    attendee: attendee.clone(),
                    tables: held,
                });
            }
        }
    }

    violations
}
