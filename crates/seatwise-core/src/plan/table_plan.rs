#![allow(clippy::module_name_repetitions)]

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Version;
use crate::config::{EngineConfig, GeometryConfig, PlanningConfig};
use crate::error::PlanError;
use crate::graph::{FamilyGraph, Forest};
use crate::model::{Attendee, AttendeeId, FixedZone, Table, TableNumber};
use crate::seating::{
    self, SeatingStats, VenueLayout, Violation, place_table, recompute_stats, unassign_seat,
    validate_layout,
};

#[derive(Debug, Deserialize)]
struct PlanRecord {
    layout: VenueLayout,
    attendees: FamilyGraph,
    #[serde(default)]
    version: Version,
    forest_version: Option<Version>,
}

/// One venue layout plus the attendee collection it serves.
///
/// Mutating methods take the version the caller read and return the new
/// one. On any error the plan, its version included, is left unchanged.
///
/// A deserialized plan is rebuilt through the same checks as
/// [`replace_layout`](Self::replace_layout), so a stored plan with
/// overlapping tables or double-booked seats is refused at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PlanRecord")]
pub struct TablePlan {
    layout: VenueLayout,
    attendees: FamilyGraph,
    version: Version,
    /// Version committed by the last graph mutation; the cached forest
    /// reflects exactly this plan version.
    forest_version: Version,
    #[serde(skip)]
    planning: PlanningConfig,
}

impl TablePlan {
    #[must_use]
    pub fn new(layout: VenueLayout, attendees: FamilyGraph) -> Self {
        Self {
            layout,
            attendees,
            version: Version::INITIAL,
            forest_version: Version::INITIAL,
            planning: PlanningConfig::default(),
        }
    }

    /// Apply `config`: geometry to the layout, planning switches to the plan.
    ///
    /// Tables already placed are re-placed under the new geometry, so a
    /// footprint that grows into a neighbour is refused rather than left
    /// overlapping. The version is not bumped.
    ///
    /// # Errors
    ///
    /// [`PlanError::Invalid`] for bad geometry, or the first seating error
    /// met while rebuilding the layout.
    pub fn with_config(mut self, config: &EngineConfig) -> Result<Self, PlanError> {
        if self.layout.geometry() != &config.geometry {
            self.layout = rebuild_layout(&self.layout, config.geometry, &self.attendees)?;
        }
        self.planning = config.planning.clone();
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    #[must_use]
    pub const fn layout(&self) -> &VenueLayout {
        &self.layout
    }

    #[must_use]
    pub const fn attendees(&self) -> &FamilyGraph {
        &self.attendees
    }

    #[must_use]
    pub const fn planning(&self) -> &PlanningConfig {
        &self.planning
    }

    pub fn forest(&self) -> &Forest {
        self.attendees.forest()
    }

    /// The plan version the family forest was last changed at. Seat and
    /// layout edits advance [`version`](Self::version) but leave this alone,
    /// so a caller holding a rendered forest can tell whether it is current.
    #[must_use]
    pub const fn forest_version(&self) -> Version {
        self.forest_version
    }

    #[must_use]
    pub fn seat_of(&self, attendee: &AttendeeId) -> Option<TableNumber> {
        self.layout.seat_of(attendee)
    }

    #[must_use]
    pub fn stats(&self) -> SeatingStats {
        recompute_stats(&self.layout, self.attendees.iter())
    }

    #[must_use]
    pub fn violations(&self) -> Vec<Violation> {
        validate_layout(&self.layout, &self.attendees)
    }

    // -----------------------------------------------------------------------
    // Graph mutations
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// [`PlanError::StaleVersion`], or the graph's insertion error.
    pub fn insert_attendee(
        &mut self,
        expected: Version,
        attendee: Attendee,
    ) -> Result<Version, PlanError> {
        self.ensure_version(expected)?;
        self.attendees.insert(attendee)?;
        Ok(self.commit_graph())
    }

    /// # Errors
    ///
    /// [`PlanError::StaleVersion`], or the graph's update error.
    pub fn update_attendee(
        &mut self,
        expected: Version,
        attendee: Attendee,
    ) -> Result<Version, PlanError> {
        self.ensure_version(expected)?;
        self.attendees.update(attendee)?;
        Ok(self.commit_graph())
    }

    /// # Errors
    ///
    /// [`PlanError::StaleVersion`], `NotFound` or `Cycle`.
    pub fn attach(
        &mut self,
        expected: Version,
        child: &AttendeeId,
        parent: &AttendeeId,
    ) -> Result<Version, PlanError> {
        self.ensure_version(expected)?;
        self.attendees.attach(child, parent)?;
        Ok(self.commit_graph())
    }

    /// Returns the new version and the parent `child` was detached from.
    ///
    /// # Errors
    ///
    /// [`PlanError::StaleVersion`] or `NotFound`.
    pub fn detach(
        &mut self,
        expected: Version,
        child: &AttendeeId,
    ) -> Result<(Version, Option<AttendeeId>), PlanError> {
        self.ensure_version(expected)?;
        let previous = self.attendees.detach(child)?;
        Ok((self.commit_graph(), previous))
    }

    // -----------------------------------------------------------------------
    // Layout mutations
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// [`PlanError::StaleVersion`], `DuplicateNumber`, `Bounds` or `Overlap`.
    pub fn place_table(&mut self, expected: Version, table: Table) -> Result<Version, PlanError> {
        self.ensure_version(expected)?;
        place_table(&mut self.layout, table)?;
        Ok(self.commit())
    }

    /// Returns the new version and the attendees who lost their seat.
    ///
    /// # Errors
    ///
    /// [`PlanError::StaleVersion`] or `NotFound`.
    pub fn remove_table(
        &mut self,
        expected: Version,
        number: TableNumber,
    ) -> Result<(Version, Vec<AttendeeId>), PlanError> {
        self.ensure_version(expected)?;
        let unseated = self.layout.remove_table(number)?;
        Ok((self.commit(), unseated))
    }

    /// # Errors
    ///
    /// [`PlanError::StaleVersion`] or `Overlap` if the zone covers a table.
    pub fn add_zone(&mut self, expected: Version, zone: FixedZone) -> Result<Version, PlanError> {
        self.ensure_version(expected)?;
        self.layout.add_zone(zone)?;
        Ok(self.commit())
    }

    /// Swap in a new venue layout.
    ///
    /// The replacement is rebuilt through the same checks as incremental
    /// edits: zones first, then every table, then every recorded
    /// assignment. The first failure aborts and keeps the current layout.
    ///
    /// # Errors
    ///
    /// [`PlanError::StaleVersion`], [`PlanError::Invalid`] for bad extents,
    /// or the first seating error met while rebuilding.
    pub fn replace_layout(
        &mut self,
        expected: Version,
        layout: VenueLayout,
    ) -> Result<Version, PlanError> {
        self.ensure_version(expected)?;
        let rebuilt = rebuild_layout(&layout, *layout.geometry(), &self.attendees)?;

        debug!(
            layout = %rebuilt.name,
            tables = rebuilt.tables().len(),
            "layout replaced"
        );
        self.layout = rebuilt;
        Ok(self.commit())
    }

    // -----------------------------------------------------------------------
    // Seat mutations
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// [`PlanError::StaleVersion`], `NotFound`, `AlreadySeated` or
    /// `CapacityExceeded`.
    pub fn assign_seat(
        &mut self,
        expected: Version,
        attendee: &AttendeeId,
        number: TableNumber,
    ) -> Result<Version, PlanError> {
        self.ensure_version(expected)?;
        seating::assign_seat(&mut self.layout, &self.attendees, attendee, number)?;
        Ok(self.commit())
    }

    /// Returns the new version and the table the attendee left, if any.
    ///
    /// # Errors
    ///
    /// [`PlanError::StaleVersion`] only; unseating an unseated attendee is a
    /// successful no-op.
    pub fn unassign_seat(
        &mut self,
        expected: Version,
        attendee: &AttendeeId,
    ) -> Result<(Version, Option<TableNumber>), PlanError> {
        self.ensure_version(expected)?;
        let left = unassign_seat(&mut self.layout, attendee);
        Ok((self.commit(), left))
    }

    // -----------------------------------------------------------------------
    // Internals shared with the coordinator
    // -----------------------------------------------------------------------

    pub(crate) fn ensure_version(&self, expected: Version) -> Result<(), PlanError> {
        if expected == self.version {
            Ok(())
        } else {
            Err(PlanError::StaleVersion {
                expected,
                current: self.version,
            })
        }
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut VenueLayout, &mut FamilyGraph) {
        (&mut self.layout, &mut self.attendees)
    }

    pub(crate) fn replace_parts(&mut self, layout: VenueLayout, attendees: FamilyGraph) {
        self.layout = layout;
        self.attendees = attendees;
    }

    pub(crate) fn commit(&mut self) -> Version {
        self.version = self.version.next();
        debug!(version = %self.version, "plan version bumped");
        self.version
    }

    /// Commit a change that touched the attendee graph.
    pub(crate) fn commit_graph(&mut self) -> Version {
        self.forest_version = self.commit();
        self.forest_version
    }
}

impl TryFrom<PlanRecord> for TablePlan {
    type Error = PlanError;

    fn try_from(record: PlanRecord) -> Result<Self, Self::Error> {
        let layout = rebuild_layout(&record.layout, *record.layout.geometry(), &record.attendees)?;
        Ok(Self {
            layout,
            attendees: record.attendees,
            version: record.version,
            forest_version: record.forest_version.unwrap_or(record.version),
            planning: PlanningConfig::default(),
        })
    }
}

/// Re-create `source` under `geometry`: zones first, then every table, then
/// every recorded assignment, each through the incremental checks.
fn rebuild_layout(
    source: &VenueLayout,
    geometry: GeometryConfig,
    attendees: &FamilyGraph,
) -> Result<VenueLayout, PlanError> {
    let mut rebuilt =
        VenueLayout::with_geometry(source.name.clone(), source.width(), source.height(), geometry)?;
    for zone in source.zones() {
        rebuilt.add_zone(*zone)?;
    }
    for table in source.tables() {
        place_table(&mut rebuilt, table.clone())?;
    }
    for table in source.tables() {
        for attendee in table.assigned() {
            seating::assign_seat(&mut rebuilt, attendees, attendee, table.number)?;
        }
    }
    Ok(rebuilt)
}
