//! Table placement and seat assignment.
//!
//! Every function checks all of its preconditions before touching the
//! layout, so an error always leaves the layout exactly as it was.

use tracing::debug;

use super::geometry::footprint;
use super::{Missing, Obstacle, SeatingError, VenueLayout};
use crate::model::{AttendeeDirectory, AttendeeId, Table, TableNumber};

/// Add `table` to the layout.
///
/// Checks run in a fixed order: number already in use, footprint outside
/// the venue, footprint intersecting a placed table (in placement order),
/// footprint intersecting a fixed zone. A placed table starts with no
/// assignments; seats are only filled through [`assign_seat`].
///
/// # Errors
///
/// [`SeatingError::DuplicateNumber`], [`SeatingError::Bounds`] or
/// [`SeatingError::Overlap`] for the first failed check.
pub fn place_table(layout: &mut VenueLayout, mut table: Table) -> Result<(), SeatingError> {
    if layout.table(table.number).is_some() {
        return Err(SeatingError::DuplicateNumber(table.number));
    }

    let claimed = footprint(&table, layout.geometry());
    if !claimed.within(layout.width(), layout.height()) {
        return Err(SeatingError::Bounds {
            table: table.number,
            footprint: claimed,
        });
    }

    if let Some(other) = layout
        .tables()
        .iter()
        .find(|other| layout.footprint(other).intersects(&claimed))
    {
        return Err(SeatingError::Overlap {
            table: table.number,
            with: Obstacle::Table(other.number),
        });
    }

    if let Some(zone) = layout.zones().iter().find(|z| z.area().intersects(&claimed)) {
        return Err(SeatingError::Overlap {
            table: table.number,
            with: Obstacle::Zone(zone.kind),
        });
    }

    let dropped = table.take_assignments();
    debug!(
        layout = %layout.name,
        table = %table.number,
        shape = %table.shape,
        capacity = %table.capacity,
        dropped = dropped.len(),
        "table placed"
    );
    layout.push_table(table);
    Ok(())
}

/// Seat `attendee` at table `number`.
///
/// Seating someone at the table they already occupy succeeds without
/// changing anything.
///
/// # Errors
///
/// - [`SeatingError::NotFound`] if `directory` does not know the attendee or
///   the layout has no such table.
/// - [`SeatingError::AlreadySeated`] if the attendee sits at another table.
/// - [`SeatingError::CapacityExceeded`] if the table is full.
pub fn assign_seat<D>(
    layout: &mut VenueLayout,
    directory: &D,
    attendee: &AttendeeId,
    number: TableNumber,
) -> Result<(), SeatingError>
where
    D: AttendeeDirectory + ?Sized,
{
    if !directory.contains_attendee(attendee) {
        return Err(SeatingError::NotFound(Missing::Attendee(attendee.clone())));
    }
    if layout.table(number).is_none() {
        return Err(SeatingError::NotFound(Missing::Table(number)));
    }

    match layout.seat_of(attendee) {
        Some(current) if current == number => return Ok(()),
        Some(current) => {
            return Err(SeatingError::AlreadySeated {
                attendee: attendee.clone(),
                table: current,
            });
        }
        None => {}
    }

    let table = layout
        .table_mut(number)
        .ok_or(SeatingError::NotFound(Missing::Table(number)))?;
    if table.is_full() {
        return Err(SeatingError::CapacityExceeded {
            table: number,
            capacity: table.capacity,
        });
    }
    table.push_assignment(attendee.clone());
    debug!(%attendee, table = %number, free = table.free_seats(), "seat assigned");
    Ok(())
}

/// Remove `attendee` from whichever table holds them. Returns that table,
/// or `None` if they were not seated.
///
/// A loaded layout can list one attendee at several tables; every such
/// seat is released and the first one in placement order is returned.
pub fn unassign_seat(layout: &mut VenueLayout, attendee: &AttendeeId) -> Option<TableNumber> {
    let released = layout.release(attendee);
    let first = released.first().copied()?;
    debug!(%attendee, table = %first, seats = released.len(), "seat released");
    Some(first)
}
