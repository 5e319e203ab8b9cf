// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Doorway openings in wall sections
//!
//! A wall section lives in the wall's local plane: X runs along the wall from
//! `-length/2` to `length/2`, Y runs from `-height/2` (floor) to `height/2`.
//! Doorways are floor-anchored rectangles in that plane.

use crate::bool2d::{subtract_holes, union_contours};
use crate::error::Result;
use crate::extrusion::{extrude_all, ExtrudedSolid};
use crate::profile::{build_shape, rectangle_contour, Shape2D};
use crate::room::WallRole;
use nalgebra::{Matrix4, Point2, Vector3};
use smallvec::SmallVec;
use tracing::debug;

/// A rectangular doorway in a wall
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Doorway {
    /// Center offset along the wall's long axis
    pub x: f64,
    pub width: f64,
    /// Measured up from the floor
    pub height: f64,
}

impl Doorway {
    pub fn new(x: f64, width: f64, height: f64) -> Self {
        Self { x, width, height }
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.x - self.width / 2.0
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Hole contour in a section of the given wall height
    pub fn contour(&self, wall_height: f64) -> Vec<Point2<f64>> {
        let bottom = -wall_height / 2.0;
        rectangle_contour(self.left(), bottom, self.right(), bottom + self.height)
    }

    /// Horizontal ranges intersect with positive length
    pub fn overlaps(&self, other: &Doorway) -> bool {
        self.left() < other.right() && other.left() < self.right()
    }
}

/// Sort by offset, ties by width then height
pub fn sort_doorways(doorways: &mut [Doorway]) {
    doorways.sort_by(|a, b| {
        a.x.total_cmp(&b.x)
            .then(a.width.total_cmp(&b.width))
            .then(a.height.total_cmp(&b.height))
    });
}

/// Raw wall section: the outer rectangle with one hole per doorway, in
/// offset order
pub fn wall_section(length: f64, height: f64, doorways: &[Doorway]) -> Shape2D {
    let mut sorted: SmallVec<[Doorway; 4]> = doorways.iter().copied().collect();
    sort_doorways(&mut sorted);

    let half_l = length / 2.0;
    let half_h = height / 2.0;
    build_shape(
        rectangle_contour(-half_l, -half_h, half_l, half_h),
        sorted.iter().map(|d| d.contour(height)).collect(),
    )
}

/// Build a wall solid relative to its center, oriented for its role
///
/// The section is cleaned with a 2D difference before extrusion, so doorways
/// may overlap each other or run past the wall's edges.
pub fn wall_solid(
    role: WallRole,
    length: f64,
    height: f64,
    thickness: f64,
    doorways: &[Doorway],
) -> Result<ExtrudedSolid> {
    let section = wall_section(length, height, doorways);

    let pieces = if section.holes.is_empty() {
        vec![section]
    } else {
        let merged = union_contours(&section.holes)?;
        if merged.len() < section.holes.len() {
            debug!(
                requested = section.holes.len(),
                openings = merged.len(),
                "overlapping doorways merged"
            );
        }
        subtract_holes(&section)?
    };

    let mut solid = extrude_all(&pieces, thickness)?;
    let place = role.orientation() * Matrix4::new_translation(&Vector3::new(0.0, 0.0, -thickness / 2.0));
    solid.transform(&place);

    debug!(
        role = role.name(),
        doorways = doorways.len(),
        pieces = pieces.len(),
        area = solid.section_area,
        "built wall solid"
    );

    Ok(solid)
}
