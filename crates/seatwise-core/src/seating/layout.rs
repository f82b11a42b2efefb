use serde::{Deserialize, Serialize};
use tracing::debug;

use super::geometry::{Rect, check_extent, footprint};
use super::{Missing, Obstacle, SeatingError};
use crate::config::GeometryConfig;
use crate::model::{AttendeeId, FixedZone, InvalidRecord, Table, TableNumber};

#[derive(Debug, Clone, Deserialize)]
struct LayoutRecord {
    name: String,
    width: f64,
    height: f64,
    #[serde(default)]
    geometry: GeometryConfig,
    #[serde(default)]
    zones: Vec<FixedZone>,
    #[serde(default)]
    tables: Vec<Table>,
}

/// The spatial plan of one venue: its extent, fixed zones and tables.
///
/// Tables are kept in placement order. Table numbers are unique for layouts
/// built through [`place_table`](super::place_table); a deserialized layout
/// may break that, which [`validate_layout`](super::validate_layout) reports.
///
/// The geometry is fixed when the layout is created and always validated.
/// Changing it means rebuilding the layout, see
/// [`TablePlan::with_config`](crate::TablePlan::with_config).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LayoutRecord")]
pub struct VenueLayout {
    pub name: String,
    width: f64,
    height: f64,
    geometry: GeometryConfig,
    zones: Vec<FixedZone>,
    tables: Vec<Table>,
}

impl VenueLayout {
    /// An empty venue of `width` x `height` metres with default geometry.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRecord::Extent`] unless both extents are finite and
    /// positive.
    pub fn new(name: impl Into<String>, width: f64, height: f64) -> Result<Self, InvalidRecord> {
        Self::with_geometry(name, width, height, GeometryConfig::default())
    }

    /// An empty venue whose footprints are sized by `geometry`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRecord::Extent`] for a bad extent and
    /// [`InvalidRecord::Geometry`] for a size or clearance that is negative,
    /// zero where a size is required, or not finite.
    pub fn with_geometry(
        name: impl Into<String>,
        width: f64,
        height: f64,
        geometry: GeometryConfig,
    ) -> Result<Self, InvalidRecord> {
        check_extent("width", width)?;
        check_extent("height", height)?;
        geometry.validate()?;
        Ok(Self {
            name: name.into(),
            width,
            height,
            geometry,
            zones: Vec::new(),
            tables: Vec::new(),
        })
    }

    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub const fn geometry(&self) -> &GeometryConfig {
        &self.geometry
    }

    #[must_use]
    pub fn zones(&self) -> &[FixedZone] {
        &self.zones
    }

    #[must_use]
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    #[must_use]
    pub fn table(&self, number: TableNumber) -> Option<&Table> {
        self.tables.iter().find(|t| t.number == number)
    }

    pub(crate) fn table_mut(&mut self, number: TableNumber) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.number == number)
    }

    pub(crate) fn push_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    /// Sum of all table capacities.
    #[must_use]
    pub fn total_capacity(&self) -> usize {
        self.tables.iter().map(|t| t.capacity.seats()).sum()
    }

    /// Seats currently taken across all tables.
    #[must_use]
    pub fn occupied_seats(&self) -> usize {
        self.tables.iter().map(Table::occupied).sum()
    }

    /// The table `attendee` is seated at, if any.
    #[must_use]
    pub fn seat_of(&self, attendee: &AttendeeId) -> Option<TableNumber> {
        self.tables
            .iter()
            .find(|t| t.seats(attendee))
            .map(|t| t.number)
    }

    /// Drop `attendee` from every table holding them, in placement order.
    pub(crate) fn release(&mut self, attendee: &AttendeeId) -> Vec<TableNumber> {
        self.tables
            .iter_mut()
            .filter_map(|t| t.remove_assignment(attendee).then_some(t.number))
            .collect()
    }

    #[must_use]
    pub fn footprint(&self, table: &Table) -> Rect {
        footprint(table, &self.geometry)
    }

    /// The venue floor as a rectangle anchored at the origin.
    #[must_use]
    pub const fn floor(&self) -> Rect {
        Rect {
            min_x: 0.0,
            min_y: 0.0,
            max_x: self.width,
            max_y: self.height,
        }
    }

    /// Add an exclusion zone.
    ///
    /// # Errors
    ///
    /// Returns [`SeatingError::Overlap`] naming the first placed table whose
    /// footprint the zone would cover. The layout is unchanged on error.
    pub fn add_zone(&mut self, zone: FixedZone) -> Result<(), SeatingError> {
        let area = zone.area();
        if let Some(table) = self
            .tables
            .iter()
            .find(|t| footprint(t, &self.geometry).intersects(&area))
        {
            return Err(SeatingError::Overlap {
                table: table.number,
                with: Obstacle::Zone(zone.kind),
            });
        }
        debug!(layout = %self.name, zone = %zone.kind, "zone added");
        self.zones.push(zone);
        Ok(())
    }

    /// Take a table out of the layout. Returns the attendees who were seated
    /// there, in seating order; they are now unseated.
    ///
    /// # Errors
    ///
    /// Returns [`SeatingError::NotFound`] if no table has `number`.
    pub fn remove_table(&mut self, number: TableNumber) -> Result<Vec<AttendeeId>, SeatingError> {
        let index = self
            .tables
            .iter()
            .position(|t| t.number == number)
            .ok_or(SeatingError::NotFound(Missing::Table(number)))?;
        let mut table = self.tables.remove(index);
        let unseated = table.take_assignments();
        debug!(
            layout = %self.name,
            %number,
            unseated = unseated.len(),
            "table removed"
        );
        Ok(unseated)
    }
}

impl TryFrom<LayoutRecord> for VenueLayout {
    type Error = InvalidRecord;

    fn try_from(record: LayoutRecord) -> Result<Self, Self::Error> {
        let mut layout =
            Self::with_geometry(record.name, record.width, record.height, record.geometry)?;
        layout.zones = record.zones;
        layout.tables = record.tables;
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Capacity, Point, Shape, ZoneKind};
    use crate::seating::{assign_seat, place_table};
    use std::collections::HashSet;

    fn round(number: u32, x: f64, y: f64) -> Table {
        Table::new(
            TableNumber(number),
            Shape::Round,
            Capacity::new(8).expect("capacity"),
            Point::new(x, y).expect("point"),
        )
    }

    #[test]
    fn new_rejects_degenerate_venues() {
        assert!(VenueLayout::new("hall", 0.0, 10.0).is_err());
        assert!(VenueLayout::new("hall", 10.0, f64::INFINITY).is_err());
        assert!(VenueLayout::new("hall", 10.0, 10.0).is_ok());
    }

    #[test]
    fn total_capacity_follows_placement_and_removal() {
        let mut layout = VenueLayout::new("hall", 20.0, 20.0).expect("layout");
        assert_eq!(layout.total_capacity(), 0);
        place_table(&mut layout, round(1, 1.0, 1.0)).expect("place 1");
        place_table(&mut layout, round(2, 6.0, 1.0)).expect("place 2");
        assert_eq!(layout.total_capacity(), 16);
        layout.remove_table(TableNumber(1)).expect("remove");
        assert_eq!(layout.total_capacity(), 8);
    }

    #[test]
    fn remove_table_returns_unseated_guests() {
        let mut layout = VenueLayout::new("hall", 20.0, 20.0).expect("layout");
        place_table(&mut layout, round(1, 1.0, 1.0)).expect("place");
        let known: HashSet<AttendeeId> = ["a", "b"].into_iter().map(AttendeeId::new_unchecked).collect();
        for raw in ["a", "b"] {
            assign_seat(&mut layout, &known, &AttendeeId::new_unchecked(raw), TableNumber(1))
                .expect("assign");
        }
        let unseated = layout.remove_table(TableNumber(1)).expect("remove");
        assert_eq!(unseated.len(), 2);
        assert_eq!(layout.seat_of(&AttendeeId::new_unchecked("a")), None);
        assert_eq!(
            layout.remove_table(TableNumber(1)),
            Err(SeatingError::NotFound(Missing::Table(TableNumber(1))))
        );
    }

    #[test]
    fn zone_over_a_table_is_rejected() {
        let mut layout = VenueLayout::new("hall", 20.0, 20.0).expect("layout");
        place_table(&mut layout, round(4, 2.0, 2.0)).expect("place");
        let stage = FixedZone::new(ZoneKind::Stage, Point::new(3.0, 3.0).expect("point"), 4.0, 2.0)
            .expect("zone");
        assert_eq!(
            layout.add_zone(stage),
            Err(SeatingError::Overlap {
                table: TableNumber(4),
                with: Obstacle::Zone(ZoneKind::Stage),
            })
        );
        let buffet = FixedZone::new(ZoneKind::Buffet, Point::new(12.0, 12.0).expect("point"), 3.0, 1.0)
            .expect("zone");
        layout.add_zone(buffet).expect("clear of tables");
        assert_eq!(layout.zones().len(), 1);
    }

    #[test]
    fn deserialization_validates_extents() {
        let ok = r#"{"name":"barn","width":12.0,"height":8.0}"#;
        let layout: VenueLayout = serde_json::from_str(ok).expect("valid layout");
        assert_eq!(layout.geometry(), &GeometryConfig::default());
        let bad = r#"{"name":"barn","width":-1.0,"height":8.0}"#;
        assert!(serde_json::from_str::<VenueLayout>(bad).is_err());
    }

    #[test]
    fn invalid_geometry_is_refused() {
        let inverted = GeometryConfig {
            round_diameter: -5.0,
            round_clearance: 0.0,
            ..GeometryConfig::default()
        };
        assert!(matches!(
            VenueLayout::with_geometry("hall", 10.0, 10.0, inverted),
            Err(InvalidRecord::Geometry {
                key: "round_diameter",
                ..
            })
        ));

        let json = r#"{"name":"barn","width":12.0,"height":8.0,
                       "geometry":{"square_clearance":-0.5}}"#;
        let err = serde_json::from_str::<VenueLayout>(json).expect_err("negative clearance");
        assert!(err.to_string().contains("square_clearance"));
    }

    #[test]
    fn custom_geometry_sizes_footprints() {
        let wide = GeometryConfig {
            round_diameter: 3.0,
            ..GeometryConfig::default()
        };
        let mut layout = VenueLayout::with_geometry("hall", 20.0, 10.0, wide).expect("layout");
        place_table(&mut layout, round(1, 1.0, 1.0)).expect("place 1");
        // 1.0 + 3.0 + 0.6 clearance reaches past 4.0 - 0.6
        assert!(matches!(
            place_table(&mut layout, round(2, 4.0, 1.0)),
            Err(SeatingError::Overlap { table: TableNumber(2), .. })
        ));
        place_table(&mut layout, round(2, 6.0, 1.0)).expect("clear of table 1");
        assert!(crate::seating::validate_layout(&layout, &HashSet::<AttendeeId>::new()).is_empty());
    }
}
