// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Triangle meshes for walls, floors and boxes

use nalgebra::{Matrix4, Point3, Vector3};

/// Indexed triangle mesh with per-vertex normals
///
/// Buffers are flat `f32` triples. Equality is exact on every buffer, so a
/// cloned mesh compares equal to its source until either one is edited.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mesh {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
}

#[inline]
fn push3(buffer: &mut Vec<f32>, x: f64, y: f64, z: f64) {
    buffer.extend_from_slice(&[x as f32, y as f32, z as f32]);
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty mesh with room for `vertices` vertices and `triangles` triangles
    pub fn with_capacity(vertices: usize, triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices * 3),
            normals: Vec::with_capacity(vertices * 3),
            indices: Vec::with_capacity(triangles * 3),
        }
    }

    /// Append a vertex and return its index
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>, normal: Vector3<f64>) -> u32 {
        let index = self.vertex_count() as u32;
        push3(&mut self.positions, position.x, position.y, position.z);
        push3(&mut self.normals, normal.x, normal.y, normal.z);
        index
    }

    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }

    /// Append a flat quad `a b c d` (counter-clockwise seen from `normal`)
    pub fn add_quad(&mut self, corners: [Point3<f64>; 4], normal: Vector3<f64>) {
        let [a, b, c, d] = corners.map(|p| self.add_vertex(p, normal));
        self.add_triangle(a, b, c);
        self.add_triangle(a, c, d);
    }

    /// Append another mesh, rebasing its indices
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertex_count() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices.extend(other.indices.iter().map(|&i| i + offset));
    }

    /// Transform positions by `matrix` and normals by its inverse transpose
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for p in self.positions.chunks_exact_mut(3) {
            let q = matrix.transform_point(&Point3::new(f64::from(p[0]), f64::from(p[1]), f64::from(p[2])));
            p.copy_from_slice(&[q.x as f32, q.y as f32, q.z as f32]);
        }

        let normal_matrix = matrix.try_inverse().unwrap_or(*matrix).transpose();
        for n in self.normals.chunks_exact_mut(3) {
            let v = normal_matrix
                .transform_vector(&Vector3::new(f64::from(n[0]), f64::from(n[1]), f64::from(n[2])))
                .try_normalize(1e-12)
                .unwrap_or_else(Vector3::zeros);
            n.copy_from_slice(&[v.x as f32, v.y as f32, v.z as f32]);
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn position(&self, index: usize) -> Point3<f32> {
        Point3::from_slice(&self.positions[index * 3..index * 3 + 3])
    }

    #[inline]
    pub fn normal(&self, index: usize) -> Vector3<f32> {
        Vector3::from_column_slice(&self.normals[index * 3..index * 3 + 3])
    }

    /// Axis-aligned bounds; both corners are the origin for an empty mesh
    pub fn bounds(&self) -> (Point3<f32>, Point3<f32>) {
        let mut points = (0..self.vertex_count()).map(|i| self.position(i));
        let Some(first) = points.next() else {
            return (Point3::origin(), Point3::origin());
        };
        points.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p)))
    }

    /// Triangles as vertex index triples
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.indices.clear();
    }
}
