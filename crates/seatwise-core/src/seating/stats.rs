use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::VenueLayout;
use crate::model::{Attendee, AttendeeId};

/// Headline numbers for the planner dashboard.
///
/// `seated + unseated_confirmed == confirmed_total` holds for every value
/// produced by [`recompute_stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatingStats {
    /// Attendees with a confirmed RSVP.
    pub confirmed_total: usize,
    /// Confirmed attendees holding a seat.
    pub seated: usize,
    /// Confirmed attendees without a seat.
    pub unseated_confirmed: usize,
    /// Attendees holding a seat whose RSVP is not confirmed.
    pub seated_unconfirmed: usize,
    pub total_capacity: usize,
    /// Seats taken, confirmed or not.
    pub occupied_seats: usize,
    pub capacity_remaining: usize,
    /// Confirmed attendees plus their confirmed companions.
    pub expected_headcount: usize,
    /// Companions who would not fit once every unseated confirmed attendee
    /// has taken a free seat.
    pub plus_ones_without_seat: usize,
}

impl SeatingStats {
    /// Share of confirmed attendees who are seated, `0.0..=100.0`.
    /// Vacuously complete when nobody has confirmed.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent_seated(&self) -> f64 {
        if self.confirmed_total == 0 {
            return 100.0;
        }
        self.seated as f64 / self.confirmed_total as f64 * 100.0
    }
}

impl fmt::Display for SeatingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} confirmed seated, {} of {} seats free",
            self.seated, self.confirmed_total, self.capacity_remaining, self.total_capacity
        )
    }
}

/// Compute statistics for `attendees` against `layout`. Pure: equal inputs
/// give equal outputs and nothing is mutated.
pub fn recompute_stats<'a, I>(layout: &VenueLayout, attendees: I) -> SeatingStats
where
    I: IntoIterator<Item = &'a Attendee>,
{
    let seated_ids: HashSet<&AttendeeId> = layout
        .tables()
        .iter()
        .flat_map(|t| t.assigned().iter())
        .collect();

    let mut stats = SeatingStats {
        total_capacity: layout.total_capacity(),
        occupied_seats: layout.occupied_seats(),
        ..SeatingStats::default()
    };
    let mut companions = 0usize;

    for attendee in attendees {
        let seated = seated_ids.contains(&attendee.id);
        if attendee.is_confirmed() {
            stats.confirmed_total += 1;
            if seated {
                stats.seated += 1;
            } else {
                stats.unseated_confirmed += 1;
            }
            if attendee.has_plus_one() {
                companions += 1;
            }
        } else if seated {
            stats.seated_unconfirmed += 1;
        }
    }

    stats.capacity_remaining = stats.total_capacity.saturating_sub(stats.occupied_seats);
    stats.expected_headcount = stats.confirmed_total + companions;
    let free_for_companions = stats
        .capacity_remaining
        .saturating_sub(stats.unseated_confirmed);
    stats.plus_ones_without_seat = companions.saturating_sub(free_for_companions);
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Capacity, Category, Point, Shape, Side, Table, TableNumber};
    use crate::seating::{assign_seat, place_table};

    fn guest(raw: &str, confirmed: bool) -> Attendee {
        Attendee::new(
            AttendeeId::new_unchecked(raw),
            raw,
            "Guest",
            Side::Common,
            Category::CloseFriend,
        )
        .confirmed(confirmed)
    }

    fn layout_with_table(seats: u16) -> VenueLayout {
        let mut layout = VenueLayout::new("hall", 10.0, 10.0).expect("layout");
        let table = Table::new(
            TableNumber(1),
            Shape::Round,
            Capacity::new(seats).expect("capacity"),
            Point::new(2.0, 2.0).expect("point"),
        );
        place_table(&mut layout, table).expect("place");
        layout
    }

    #[test]
    fn empty_inputs_are_all_zero() {
        let layout = VenueLayout::new("hall", 10.0, 10.0).expect("layout");
        let stats = recompute_stats(&layout, &Vec::<Attendee>::new());
        assert_eq!(stats, SeatingStats::default());
        assert!((stats.percent_seated() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn confirmed_split_between_seated_and_unseated() {
        let mut layout = layout_with_table(4);
        let people = vec![
            guest("a", true),
            guest("b", true),
            guest("c", false),
            guest("d", true),
        ];
        for raw in ["a", "c"] {
            assign_seat(&mut layout, &people, &AttendeeId::new_unchecked(raw), TableNumber(1))
                .expect("assign");
        }

        let stats = recompute_stats(&layout, &people);
        assert_eq!(stats.confirmed_total, 3);
        assert_eq!(stats.seated, 1);
        assert_eq!(stats.unseated_confirmed, 2);
        assert_eq!(stats.seated_unconfirmed, 1);
        assert_eq!(stats.occupied_seats, 2);
        assert_eq!(stats.total_capacity, 4);
        assert_eq!(stats.capacity_remaining, 2);
        assert_eq!(stats.seated + stats.unseated_confirmed, stats.confirmed_total);
    }

    #[test]
    fn companions_beyond_free_capacity_are_counted() {
        let layout = layout_with_table(3);
        let people = vec![
            guest("a", true).with_plus_one(None),
            guest("b", true).with_plus_one(Some("Ola".into())),
            guest("c", false).with_plus_one(None),
        ];
        let stats = recompute_stats(&layout, &people);
        assert_eq!(stats.expected_headcount, 4);
        // 3 free seats, 2 taken by a and b, 1 left for 2 companions.
        assert_eq!(stats.plus_ones_without_seat, 1);
    }

    #[test]
    fn recompute_is_pure() {
        let layout = layout_with_table(2);
        let people = vec![guest("a", true), guest("b", false)];
        let before = layout.clone();
        assert_eq!(recompute_stats(&layout, &people), recompute_stats(&layout, &people));
        assert_eq!(layout, before);
    }
}
