// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D Boolean Operations for Wall-Section Clean-up
//!
//! Doorway holes are requested as plain rectangles. Two doorways may overlap,
//! and every doorway touches the bottom edge of its wall, so the raw
//! boundary-with-holes is not a valid triangulation input. Subtracting the
//! holes from the outer boundary with i_overlay turns that raw section into
//! well-formed polygons: touching holes become notches, overlapping holes
//! merge, and a hole spanning the full height splits the section.

use crate::error::{Error, Result};
use crate::profile::Shape2D;
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use nalgebra::Point2;

/// Minimum area threshold - polygons smaller than this are considered degenerate
const MIN_AREA_THRESHOLD: f64 = 1e-10;

/// Subtract every hole of a shape from its outer boundary
///
/// Returns the resulting pieces, each with a counter-clockwise outer boundary
/// and clockwise holes. A shape without holes is returned unchanged. An empty
/// result means the holes cover the whole boundary.
pub fn subtract_holes(shape: &Shape2D) -> Result<Vec<Shape2D>> {
    if shape.outer.len() < 3 {
        return Err(Error::InvalidProfile(
            "Shape must have at least 3 vertices".to_string(),
        ));
    }

    let holes: Vec<&Vec<Point2<f64>>> = shape
        .holes
        .iter()
        .filter(|h| is_valid_contour(h))
        .collect();

    if holes.is_empty() {
        return Ok(vec![shape.normalized()]);
    }

    if !is_valid_contour(&shape.outer) {
        // Zero-area boundary: nothing to cut, keep the degenerate outline
        return Ok(vec![Shape2D::new(shape.outer.clone())]);
    }

    let subject = vec![contour_to_path(&ensure_ccw(&shape.outer))];

    // Same winding for every clip contour so NonZero fill unions overlaps
    let clip: Vec<Vec<[f64; 2]>> = holes
        .iter()
        .map(|h| contour_to_path(&ensure_ccw(h)))
        .collect();

    let result = subject.overlay(&clip, OverlayRule::Difference, FillRule::NonZero);

    Ok(shapes_to_profiles(&result))
}

/// Union multiple contours
///
/// Overlapping contours collapse into one outline. Returned contours are
/// counter-clockwise.
pub fn union_contours(contours: &[Vec<Point2<f64>>]) -> Result<Vec<Vec<Point2<f64>>>> {
    let valid: Vec<&Vec<Point2<f64>>> = contours.iter().filter(|c| c.len() >= 3).collect();

    if valid.is_empty() {
        return Ok(Vec::new());
    }

    if valid.len() == 1 {
        return Ok(vec![ensure_ccw(valid[0])]);
    }

    let subject: Vec<Vec<[f64; 2]>> = vec![contour_to_path(&ensure_ccw(valid[0]))];
    let clip: Vec<Vec<[f64; 2]>> = valid
        .iter()
        .skip(1)
        .map(|c| contour_to_path(&ensure_ccw(c)))
        .collect();

    let result = subject.overlay(&clip, OverlayRule::Union, FillRule::NonZero);

    let mut all_contours = Vec::new();
    for shape in result {
        if let Some(outer) = shape.first() {
            let points = path_to_contour(outer);
            if points.len() >= 3 {
                all_contours.push(ensure_ccw(&points));
            }
        }
    }

    Ok(all_contours)
}

/// Check if a contour is valid (has area, not degenerate)
pub fn is_valid_contour(contour: &[Point2<f64>]) -> bool {
    if contour.len() < 3 {
        return false;
    }

    compute_signed_area(contour).abs() > MIN_AREA_THRESHOLD
}

/// Compute the signed area of a 2D contour
/// Positive = counter-clockwise, Negative = clockwise
pub fn compute_signed_area(contour: &[Point2<f64>]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    let n = contour.len();

    for i in 0..n {
        let j = (i + 1) % n;
        area += contour[i].x * contour[j].y;
        area -= contour[j].x * contour[i].y;
    }

    area * 0.5
}

/// Ensure contour has counter-clockwise winding (positive area)
pub fn ensure_ccw(contour: &[Point2<f64>]) -> Vec<Point2<f64>> {
    if compute_signed_area(contour) < 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

/// Ensure contour has clockwise winding (for holes)
pub fn ensure_cw(contour: &[Point2<f64>]) -> Vec<Point2<f64>> {
    if compute_signed_area(contour) > 0.0 {
        contour.iter().rev().cloned().collect()
    } else {
        contour.to_vec()
    }
}

// ============================================================================
// Internal Helper Functions
// ============================================================================

/// Convert a Point2 contour to i_overlay path format
fn contour_to_path(contour: &[Point2<f64>]) -> Vec<[f64; 2]> {
    contour.iter().map(|p| [p.x, p.y]).collect()
}

fn path_to_contour(path: &[[f64; 2]]) -> Vec<Point2<f64>> {
    path.iter().map(|p| Point2::new(p[0], p[1])).collect()
}

/// Convert i_overlay result shapes back to shapes
///
/// i_overlay returns Vec<Vec<Vec<[f64; 2]>>> where:
/// - Outer Vec: list of shapes
/// - Middle Vec: list of contours per shape (first is outer, rest are holes)
/// - Inner Vec: list of points per contour
fn shapes_to_profiles(shapes: &[Vec<Vec<[f64; 2]>>]) -> Vec<Shape2D> {
    let mut profiles = Vec::with_capacity(shapes.len());

    for shape in shapes {
        let Some(outer_path) = shape.first() else {
            continue;
        };

        let outer = path_to_contour(outer_path);
        if !is_valid_contour(&outer) {
            continue;
        }

        let holes = shape
            .iter()
            .skip(1)
            .map(|c| path_to_contour(c))
            .filter(|h| is_valid_contour(h))
            .map(|h| ensure_cw(&h))
            .collect();

        profiles.push(Shape2D {
            outer: ensure_ccw(&outer),
            holes,
        });
    }

    profiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{build_shape, rectangle_contour};

    fn total_area(shapes: &[Shape2D]) -> f64 {
        shapes
            .iter()
            .map(|s| {
                compute_signed_area(&s.outer)
                    + s.holes.iter().map(|h| compute_signed_area(h)).sum::<f64>()
            })
            .sum()
    }

    #[test]
    fn test_compute_signed_area_ccw() {
        let contour = rectangle_contour(0.0, 0.0, 1.0, 1.0);
        assert!((compute_signed_area(&contour) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ensure_ccw() {
        let mut cw = rectangle_contour(0.0, 0.0, 1.0, 1.0);
        cw.reverse();
        assert!(compute_signed_area(&cw) < 0.0);
        assert!(compute_signed_area(&ensure_ccw(&cw)) > 0.0);
    }

    #[test]
    fn test_interior_hole_is_kept() {
        let shape = build_shape(
            rectangle_contour(0.0, 0.0, 10.0, 10.0),
            vec![rectangle_contour(4.0, 4.0, 6.0, 6.0)],
        );

        let result = subtract_holes(&shape).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].holes.len(), 1);
        assert!((total_area(&result) - 96.0).abs() < 1e-6);
    }

    #[test]
    fn test_hole_touching_edge_becomes_notch() {
        let shape = build_shape(
            rectangle_contour(0.0, 0.0, 10.0, 3.0),
            vec![rectangle_contour(4.0, 0.0, 6.0, 2.0)],
        );

        let result = subtract_holes(&shape).unwrap();
        assert_eq!(result.len(), 1);
        assert!(result[0].holes.is_empty());
        assert!((total_area(&result) - 26.0).abs() < 1e-6);
    }

    #[test]
    fn test_overlapping_holes_merge() {
        let shape = build_shape(
            rectangle_contour(0.0, 0.0, 10.0, 10.0),
            vec![
                rectangle_contour(2.0, 2.0, 5.0, 5.0),
                rectangle_contour(4.0, 2.0, 7.0, 5.0),
            ],
        );

        let result = subtract_holes(&shape).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].holes.len(), 1);
        // 100 - (5 x 3)
        assert!((total_area(&result) - 85.0).abs() < 1e-6);
    }

    #[test]
    fn test_full_height_hole_splits_shape() {
        let shape = build_shape(
            rectangle_contour(0.0, 0.0, 10.0, 3.0),
            vec![rectangle_contour(4.0, -1.0, 6.0, 4.0)],
        );

        let result = subtract_holes(&shape).unwrap();
        assert_eq!(result.len(), 2);
        assert!((total_area(&result) - 24.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_holes_passthrough() {
        let shape = build_shape(rectangle_contour(0.0, 0.0, 2.0, 2.0), Vec::new());
        let result = subtract_holes(&shape).unwrap();
        assert_eq!(result, vec![shape]);
    }

    #[test]
    fn test_is_valid_contour() {
        assert!(is_valid_contour(&rectangle_contour(0.0, 0.0, 1.0, 1.0)));

        let degenerate = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
        ];
        assert!(!is_valid_contour(&degenerate));
        assert!(!is_valid_contour(&[Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)]));
    }

    #[test]
    fn test_union_contours() {
        let contours = vec![
            rectangle_contour(0.0, 0.0, 2.0, 2.0),
            rectangle_contour(1.0, 1.0, 3.0, 3.0),
        ];

        let result = union_contours(&contours).unwrap();
        assert_eq!(result.len(), 1);
        assert!((compute_signed_area(&result[0]) - 7.0).abs() < 1e-6);
    }
}
