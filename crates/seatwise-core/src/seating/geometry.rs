//! Axis-aligned footprints for overlap and bounds checks.
//!
//! Every table is reduced to a rectangle: its body (round tables use the
//! circumscribing square) grown on all four sides by the shape's clearance
//! margin. Checks are O(1) per pair and conservative: two footprints that
//! intersect may still leave a walkable gap in reality, but two tables whose
//! bodies overlap always produce intersecting footprints.
//!
//! Edges that merely touch do not count as an overlap.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::GeometryConfig;
use crate::model::{InvalidRecord, Point, Shape, Table};

/// Absorbs float noise from coordinates such as `1.4 + 3.0`.
const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    /// # Errors
    ///
    /// Returns [`InvalidRecord::Extent`] if either extent is not finite and
    /// positive.
    pub fn new(origin: Point, width: f64, height: f64) -> Result<Self, InvalidRecord> {
        check_extent("width", width)?;
        check_extent("height", height)?;
        Ok(Self {
            min_x: origin.x(),
            min_y: origin.y(),
            max_x: origin.x() + width,
            max_y: origin.y() + height,
        })
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Strict interior intersection.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min_x < other.max_x - EPSILON
            && other.min_x < self.max_x - EPSILON
            && self.min_y < other.max_y - EPSILON
            && other.min_y < self.max_y - EPSILON
    }

    /// `true` if the rectangle lies inside `[0, width] x [0, height]`.
    #[must_use]
    pub fn within(&self, width: f64, height: f64) -> bool {
        self.min_x >= -EPSILON
            && self.min_y >= -EPSILON
            && self.max_x <= width + EPSILON
            && self.max_y <= height + EPSILON
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.2}, {:.2}]..[{:.2}, {:.2}]",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

pub(crate) fn check_extent(axis: &'static str, value: f64) -> Result<(), InvalidRecord> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(InvalidRecord::Extent { axis, value })
    }
}

/// Body dimensions `(width, depth)` of a table before clearance.
#[must_use]
pub fn body_size(shape: Shape, seats: u16, geometry: &GeometryConfig) -> (f64, f64) {
    match shape {
        Shape::Round => (geometry.round_diameter, geometry.round_diameter),
        Shape::Square => (geometry.square_side, geometry.square_side),
        Shape::Rectangular => {
            let per_side = f64::from(seats.div_ceil(2));
            let length = (per_side * geometry.rect_seat_pitch).max(geometry.rect_min_length);
            (length, geometry.rect_depth)
        }
    }
}

#[must_use]
pub fn clearance(shape: Shape, geometry: &GeometryConfig) -> f64 {
    match shape {
        Shape::Round => geometry.round_clearance,
        Shape::Square => geometry.square_clearance,
        Shape::Rectangular => geometry.rect_clearance,
    }
}

/// The rectangle a table claims in the venue, clearance included.
#[must_use]
pub fn footprint(table: &Table, geometry: &GeometryConfig) -> Rect {
    let (width, depth) = body_size(table.shape, table.capacity.get(), geometry);
    let margin = clearance(table.shape, geometry);
    let origin = table.position;
    Rect {
        min_x: origin.x() - margin,
        min_y: origin.y() - margin,
        max_x: origin.x() + width + margin,
        max_y: origin.y() + depth + margin,
    }
}
