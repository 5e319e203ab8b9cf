// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! EnvironmentBuilder Geometry
//!
//! Procedural room geometry: 2D shapes with holes triangulated with earcutr,
//! cleaned with i_overlay, extruded into solids and placed with nalgebra
//! transforms.

pub mod bool2d;
pub mod camera;
pub mod error;
pub mod extrusion;
pub mod mesh;
pub mod opening;
pub mod profile;
pub mod room;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point2, Point3, Vector3};

pub use camera::{screen_to_world, snap_to_grid, GroundProjector, PerspectiveCamera, Ray};
pub use error::{Error, Result};
pub use extrusion::{extrude, extrude_all, ExtrudedSolid};
pub use mesh::Mesh;
pub use opening::{sort_doorways, wall_section, wall_solid, Doorway};
pub use profile::{build_shape, create_rectangle, rectangle_contour, Shape2D, Triangulation};
pub use room::{local_offset, RoomBuilder, RoomGeometry, WallGeometry, WallRole, DOORWAY_SUFFIX};
