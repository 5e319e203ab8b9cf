// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D shapes with holes and their triangulation

use crate::bool2d::{ensure_ccw, ensure_cw};
use crate::error::{Error, Result};
use crate::triangulation::{triangle_signed_area, triangulate_with_holes};
use nalgebra::Point2;

/// 2D shape: an outer boundary plus zero or more holes in the same plane
///
/// Topology is not validated: a self-intersecting boundary or overlapping
/// holes produce a broken mesh downstream rather than an error.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape2D {
    /// Outer boundary
    pub outer: Vec<Point2<f64>>,
    /// Holes
    pub holes: Vec<Vec<Point2<f64>>>,
}

impl Shape2D {
    /// Create a shape without holes
    pub fn new(outer: Vec<Point2<f64>>) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// Add a hole to the shape
    pub fn add_hole(&mut self, hole: Vec<Point2<f64>>) {
        self.holes.push(hole);
    }

    /// Copy of the shape with the outer boundary counter-clockwise and every
    /// hole clockwise
    pub fn normalized(&self) -> Self {
        Self {
            outer: ensure_ccw(&self.outer),
            holes: self.holes.iter().map(|h| ensure_cw(h)).collect(),
        }
    }

    /// Triangulate the shape using earcutr
    ///
    /// Every returned triangle is counter-clockwise in the shape plane.
    pub fn triangulate(&self) -> Result<Triangulation> {
        if self.outer.len() < 3 {
            return Err(Error::InvalidProfile(
                "Shape must have at least 3 vertices".to_string(),
            ));
        }

        let mut indices = triangulate_with_holes(&self.outer, &self.holes)?;

        let mut points = Vec::with_capacity(
            self.outer.len() + self.holes.iter().map(|h| h.len()).sum::<usize>(),
        );
        points.extend_from_slice(&self.outer);
        for hole in self.holes.iter().filter(|h| h.len() >= 3) {
            points.extend_from_slice(hole);
        }

        for tri in indices.chunks_exact_mut(3) {
            if triangle_signed_area(&points[tri[0]], &points[tri[1]], &points[tri[2]]) < 0.0 {
                tri.swap(1, 2);
            }
        }

        Ok(Triangulation { points, indices })
    }
}

/// Build a shape from a boundary and hole point lists
///
/// Callers pass at least 3 points for the boundary and for each hole.
pub fn build_shape(outer: Vec<Point2<f64>>, holes: Vec<Vec<Point2<f64>>>) -> Shape2D {
    let mut shape = Shape2D::new(outer);
    for hole in holes {
        shape.add_hole(hole);
    }
    shape
}

/// Triangulated shape result
#[derive(Debug, Clone)]
pub struct Triangulation {
    /// All vertices (outer + holes)
    pub points: Vec<Point2<f64>>,
    /// Triangle indices
    pub indices: Vec<usize>,
}

impl Triangulation {
    /// Total area covered by the triangles
    pub fn area(&self) -> f64 {
        self.indices
            .chunks_exact(3)
            .map(|t| triangle_signed_area(&self.points[t[0]], &self.points[t[1]], &self.points[t[2]]).abs())
            .sum()
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Create a rectangular shape centered on the origin
#[inline]
pub fn create_rectangle(width: f64, height: f64) -> Shape2D {
    let half_w = width / 2.0;
    let half_h = height / 2.0;

    Shape2D::new(rectangle_contour(-half_w, -half_h, half_w, half_h))
}

/// Axis-aligned rectangle contour, counter-clockwise when min < max
#[inline]
pub fn rectangle_contour(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<Point2<f64>> {
    vec![
        Point2::new(min_x, min_y),
        Point2::new(max_x, min_y),
        Point2::new(max_x, max_y),
        Point2::new(min_x, max_y),
    ]
}
