// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room geometry: a floor slab and four walls built from two corner points
//!
//! All wall positions and lengths derive from the same pair of corners, so
//! adjacent walls meet without a gap. Width and depth are reduced by a small
//! gap so that rooms dragged side by side on the grid do not z-fight.

use crate::error::Result;
use crate::extrusion::{extrude, ExtrudedSolid};
use crate::opening::wall_solid;
use crate::profile::create_rectangle;
use nalgebra::{Matrix4, Point2, Point3, Vector3};
use tracing::debug;

/// Stable role of a wall within a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum WallRole {
    Front,
    Back,
    Left,
    Right,
}

impl WallRole {
    pub const ALL: [WallRole; 4] = [WallRole::Front, WallRole::Back, WallRole::Left, WallRole::Right];

    /// Role name used as the node name of an uncut wall
    pub fn name(self) -> &'static str {
        match self {
            WallRole::Front => "frontWall",
            WallRole::Back => "backWall",
            WallRole::Left => "leftWall",
            WallRole::Right => "rightWall",
        }
    }

    /// Parse a role from a node name, ignoring any doorway suffix
    pub fn from_name(name: &str) -> Option<Self> {
        let base = name.strip_suffix(DOORWAY_SUFFIX).unwrap_or(name);
        Self::ALL.into_iter().find(|r| r.name() == base)
    }

    /// Left and right walls run along the Z axis
    #[inline]
    pub fn is_side(self) -> bool {
        matches!(self, WallRole::Left | WallRole::Right)
    }

    /// World direction of the wall's local X (long) axis
    #[inline]
    pub fn long_axis(self) -> Vector3<f64> {
        if self.is_side() {
            Vector3::z()
        } else {
            Vector3::x()
        }
    }

    /// Rotation mapping the wall section plane onto the wall's world orientation
    pub fn orientation(self) -> Matrix4<f64> {
        if self.is_side() {
            Matrix4::from_axis_angle(&Vector3::y_axis(), -std::f64::consts::FRAC_PI_2)
        } else {
            Matrix4::identity()
        }
    }
}

/// Name suffix marking a wall that has at least one doorway
pub const DOORWAY_SUFFIX: &str = "Doorway";

/// Offset of a world point along a wall's long axis, relative to its center
#[inline]
pub fn local_offset(role: WallRole, center: &Point3<f64>, world: &Point3<f64>) -> f64 {
    (world - center).dot(&role.long_axis())
}

/// One wall of a room
#[derive(Debug, Clone, PartialEq)]
pub struct WallGeometry {
    pub role: WallRole,
    /// Baseline start on the ground (x, z)
    pub start: Point2<f64>,
    /// Baseline end on the ground (x, z)
    pub end: Point2<f64>,
    pub length: f64,
    pub height: f64,
    pub thickness: f64,
    /// World position of the wall's center; the solid is relative to it
    pub center: Point3<f64>,
    pub solid: ExtrudedSolid,
}

/// Floor slab plus four walls
#[derive(Debug, Clone, PartialEq)]
pub struct RoomGeometry {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
    /// Ghost room shown during a drag
    pub preview: bool,
    /// World position of the floor's center (on the ground)
    pub floor_center: Point3<f64>,
    pub floor: ExtrudedSolid,
    pub walls: [WallGeometry; 4],
}

impl RoomGeometry {
    pub fn wall(&self, role: WallRole) -> &WallGeometry {
        match role {
            WallRole::Front => &self.walls[0],
            WallRole::Back => &self.walls[1],
            WallRole::Left => &self.walls[2],
            WallRole::Right => &self.walls[3],
        }
    }

    /// Width and depth are both positive
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.depth > 0.0
    }
}

/// Builds room geometry with fixed wall dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomBuilder {
    pub wall_height: f64,
    pub wall_thickness: f64,
    pub floor_thickness: f64,
    /// Subtracted from the dragged width and depth
    pub gap: f64,
}

impl Default for RoomBuilder {
    fn default() -> Self {
        Self {
            wall_height: 3.0,
            wall_thickness: 0.1,
            floor_thickness: 0.05,
            gap: 0.1,
        }
    }
}

impl RoomBuilder {
    /// Build a room between two (already snapped) ground points
    ///
    /// Zero or negative sizes are not rejected here; the result carries them
    /// and [`RoomGeometry::is_valid`] reports it.
    pub fn build_room(
        &self,
        start: &Point3<f64>,
        end: &Point3<f64>,
        preview: bool,
    ) -> Result<RoomGeometry> {
        let width = (end.x - start.x).abs() - self.gap;
        let depth = (end.z - start.z).abs() - self.gap;
        let height = self.wall_height;
        let ground = start.y;

        let min_x = start.x.min(end.x);
        let min_z = start.z.min(end.z);
        let max_x = min_x + width;
        let max_z = min_z + depth;

        debug!(width, depth, preview, "building room");

        // Shared corners (x, z)
        let c00 = Point2::new(min_x, min_z);
        let c10 = Point2::new(max_x, min_z);
        let c01 = Point2::new(min_x, max_z);
        let c11 = Point2::new(max_x, max_z);

        let walls = [
            self.build_wall(WallRole::Front, c00, c10, ground)?,
            self.build_wall(WallRole::Back, c01, c11, ground)?,
            self.build_wall(WallRole::Left, c00, c01, ground)?,
            self.build_wall(WallRole::Right, c10, c11, ground)?,
        ];

        let floor_center = Point3::new(min_x + width / 2.0, ground, min_z + depth / 2.0);
        let floor = self.build_floor(width, depth)?;

        Ok(RoomGeometry {
            width,
            depth,
            height,
            preview,
            floor_center,
            floor,
            walls,
        })
    }

    /// Floor slab relative to its center, top face at y = 0
    fn build_floor(&self, width: f64, depth: f64) -> Result<ExtrudedSolid> {
        let mut solid = extrude(&create_rectangle(width.abs(), depth.abs()), self.floor_thickness)?;
        let lay_flat = Matrix4::from_axis_angle(&Vector3::x_axis(), -std::f64::consts::FRAC_PI_2)
            * Matrix4::new_translation(&Vector3::new(0.0, 0.0, -self.floor_thickness));
        solid.transform(&lay_flat);
        Ok(solid)
    }

    fn build_wall(
        &self,
        role: WallRole,
        start: Point2<f64>,
        end: Point2<f64>,
        ground: f64,
    ) -> Result<WallGeometry> {
        let length = (end - start).norm();
        let mid = nalgebra::center(&start, &end);
        let solid = wall_solid(role, length, self.wall_height, self.wall_thickness, &[])?;

        Ok(WallGeometry {
            role,
            start,
            end,
            length,
            height: self.wall_height,
            thickness: self.wall_thickness,
            center: Point3::new(mid.x, ground + self.wall_height / 2.0, mid.y),
            solid,
        })
    }
}
