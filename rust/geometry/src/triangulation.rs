// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ear-clipping triangulation of wall sections via earcutr

use crate::{Error, Point2, Result};

/// Triangulate an outer contour with holes
///
/// Holes with fewer than 3 points are skipped. Indices address the outer
/// points followed by the points of each kept hole, in order. A contour
/// without area yields no triangles.
pub fn triangulate_with_holes(
    outer: &[Point2<f64>],
    holes: &[Vec<Point2<f64>>],
) -> Result<Vec<usize>> {
    if outer.len() < 3 {
        return Err(Error::TriangulationError(format!(
            "outer contour has {} points, need 3",
            outer.len()
        )));
    }

    let kept = holes.iter().filter(|h| h.len() >= 3);
    let mut hole_starts = Vec::new();
    let mut flat: Vec<f64> = outer.iter().flat_map(|p| [p.x, p.y]).collect();
    for hole in kept {
        hole_starts.push(flat.len() / 2);
        flat.extend(hole.iter().flat_map(|p| [p.x, p.y]));
    }

    earcutr::earcut(&flat, &hole_starts, 2).map_err(|e| Error::TriangulationError(format!("{e:?}")))
}

/// Signed area of triangle `a b c`, positive when counter-clockwise
#[inline]
pub fn triangle_signed_area(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b - a).perp(&(c - a)) * 0.5
}
