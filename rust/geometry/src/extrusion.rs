// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion operations - converting 2D shapes to 3D solids

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::profile::{Shape2D, Triangulation};
use nalgebra::{Matrix4, Point2, Point3, Vector3};

/// A shape swept along +Z by a fixed depth
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtrudedSolid {
    /// Triangle mesh with flat per-face normals
    pub mesh: Mesh,
    /// Extrusion depth (wall thickness)
    pub depth: f64,
    /// Area of one end cap (outer area minus hole area)
    pub section_area: f64,
}

impl ExtrudedSolid {
    /// Solid with no geometry
    pub fn empty(depth: f64) -> Self {
        Self {
            mesh: Mesh::new(),
            depth,
            section_area: 0.0,
        }
    }

    /// Apply a transformation to the mesh in place
    pub fn transform(&mut self, transform: &Matrix4<f64>) {
        self.mesh.transform(transform);
    }
}

/// Extrude a 2D shape along the Z axis, from `z = 0` to `z = depth`
///
/// The shape is normalized first (outer counter-clockwise, holes clockwise) so
/// that every face of the result winds outward. Side faces are generated for
/// the outer boundary and for every hole.
pub fn extrude(shape: &Shape2D, depth: f64) -> Result<ExtrudedSolid> {
    if depth <= 0.0 {
        return Err(Error::InvalidExtrusion(
            "Depth must be positive".to_string(),
        ));
    }

    let shape = shape.normalized();
    let triangulation = shape.triangulate()?;

    let edges = shape.outer.len() + shape.holes.iter().map(Vec::len).sum::<usize>();
    let mut mesh = Mesh::with_capacity(
        triangulation.points.len() * 2 + edges * 4,
        triangulation.triangle_count() * 2 + edges * 2,
    );

    add_cap(&mut mesh, &triangulation, 0.0);
    add_cap(&mut mesh, &triangulation, depth);

    add_sides(&mut mesh, &shape.outer, depth);
    for hole in shape.holes.iter().filter(|h| h.len() >= 3) {
        add_sides(&mut mesh, hole, depth);
    }

    Ok(ExtrudedSolid {
        mesh,
        depth,
        section_area: triangulation.area(),
    })
}

/// Extrude several disjoint shapes into a single solid
pub fn extrude_all(shapes: &[Shape2D], depth: f64) -> Result<ExtrudedSolid> {
    if depth <= 0.0 {
        return Err(Error::InvalidExtrusion(
            "Depth must be positive".to_string(),
        ));
    }

    let mut solid = ExtrudedSolid::empty(depth);
    for shape in shapes {
        let part = extrude(shape, depth)?;
        solid.mesh.merge(&part.mesh);
        solid.section_area += part.section_area;
    }

    Ok(solid)
}

/// Emit one end cap
///
/// Triangles arrive counter-clockwise; the cap at `z = 0` reverses them so
/// both caps face away from the solid.
fn add_cap(mesh: &mut Mesh, triangulation: &Triangulation, z: f64) {
    let top = z > 0.0;
    let normal = if top { Vector3::z() } else { -Vector3::z() };
    let base = mesh.vertex_count() as u32;

    for point in &triangulation.points {
        mesh.add_vertex(Point3::new(point.x, point.y, z), normal);
    }
    for tri in triangulation.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| base + i as u32);
        if top {
            mesh.add_triangle(a, b, c);
        } else {
            mesh.add_triangle(a, c, b);
        }
    }
}

/// Emit the side faces swept by one contour
///
/// Material lies left of every edge (outer counter-clockwise, holes
/// clockwise), so the outward normal is the right-hand perpendicular. Hole
/// contours therefore produce the faces lining a doorway tunnel.
fn add_sides(mesh: &mut Mesh, contour: &[Point2<f64>], depth: f64) {
    let next = contour.iter().cycle().skip(1);
    for (p0, p1) in contour.iter().zip(next) {
        // Repeated points give no face
        let Some(normal) = Vector3::new(p1.y - p0.y, p0.x - p1.x, 0.0).try_normalize(1e-10) else {
            continue;
        };
        mesh.add_quad(
            [
                Point3::new(p0.x, p0.y, 0.0),
                Point3::new(p1.x, p1.y, 0.0),
                Point3::new(p1.x, p1.y, depth),
                Point3::new(p0.x, p0.y, depth),
            ],
            normal,
        );
    }
}
