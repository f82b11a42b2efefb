use serde::{Deserialize, Serialize};
use std::fmt;

use super::{InvalidRecord, Point};
use crate::seating::geometry::Rect;

/// Fixed features of a venue that tables must stay clear of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    Stage,
    DanceFloor,
    Entrance,
    Buffet,
}

impl ZoneKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stage => "stage",
            Self::DanceFloor => "dance floor",
            Self::Entrance => "entrance",
            Self::Buffet => "buffet",
        }
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ZoneRecord {
    kind: ZoneKind,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

/// An exclusion rectangle inside the venue. No clearance is added around
/// zones; table footprints already carry their own margin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ZoneRecord", into = "ZoneRecord")]
pub struct FixedZone {
    pub kind: ZoneKind,
    area: Rect,
}

impl FixedZone {
    /// # Errors
    ///
    /// Returns [`InvalidRecord`] if the extents are not finite and positive.
    pub fn new(kind: ZoneKind, origin: Point, width: f64, height: f64) -> Result<Self, InvalidRecord> {
        Ok(Self {
            kind,
            area: Rect::new(origin, width, height)?,
        })
    }

    #[must_use]
    pub const fn area(&self) -> Rect {
        self.area
    }
}

impl TryFrom<ZoneRecord> for FixedZone {
    type Error = InvalidRecord;

    fn try_from(record: ZoneRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.kind,
            Point::new(record.x, record.y)?,
            record.width,
            record.height,
        )
    }
}

impl From<FixedZone> for ZoneRecord {
    fn from(zone: FixedZone) -> Self {
        Self {
            kind: zone.kind,
            x: zone.area.min_x,
            y: zone.area.min_y,
            width: zone.area.width(),
            height: zone.area.height(),
        }
    }
}
