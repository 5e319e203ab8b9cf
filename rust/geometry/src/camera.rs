// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Screen-to-world projection
//!
//! Room corners are picked by projecting a screen point onto a horizontal
//! ground plane and snapping the result to a grid. Snapping is what keeps
//! rooms built independently corner-aligned with each other.

use nalgebra::{Point2, Point3, Vector3};

/// Half-line in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f64>,
    /// Unit direction
    pub direction: Vector3<f64>,
}

impl Ray {
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point at distance `t` along the ray
    #[inline]
    pub fn at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }

    /// Intersect with the horizontal plane `y = height`
    ///
    /// Returns `None` when the ray is parallel to the plane or points away
    /// from it.
    pub fn intersect_horizontal_plane(&self, height: f64) -> Option<Point3<f64>> {
        if self.direction.y.abs() < 1e-12 {
            return None;
        }
        let t = (height - self.origin.y) / self.direction.y;
        if t < 0.0 {
            return None;
        }
        Some(self.at(t))
    }

    /// Slab test against an axis-aligned box, returning the entry distance
    /// and the normal of the face that was hit
    pub fn intersect_aabb(
        &self,
        min: &Point3<f64>,
        max: &Point3<f64>,
    ) -> Option<(f64, Vector3<f64>)> {
        let mut t_near = f64::NEG_INFINITY;
        let mut t_far = f64::INFINITY;
        let mut normal = Vector3::zeros();

        for axis in 0..3 {
            let o = self.origin[axis];
            let d = self.direction[axis];
            if d.abs() < 1e-12 {
                if o < min[axis] || o > max[axis] {
                    return None;
                }
                continue;
            }

            let mut t0 = (min[axis] - o) / d;
            let mut t1 = (max[axis] - o) / d;
            let mut sign = -1.0;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
                sign = 1.0;
            }

            if t0 > t_near {
                t_near = t0;
                normal = Vector3::zeros();
                normal[axis] = sign;
            }
            t_far = t_far.min(t1);

            if t_near > t_far {
                return None;
            }
        }

        if t_far < 0.0 {
            return None;
        }

        Some((t_near.max(0.0), normal))
    }
}

/// Projects screen coordinates onto a horizontal world plane
pub trait GroundProjector {
    /// World point where the view ray through `screen` meets `y = plane_height`
    fn project_to_plane(&self, screen: Point2<f64>, plane_height: f64) -> Option<Point3<f64>>;
}

/// Pinhole camera looking from `eye` towards `target`
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub eye: Point3<f64>,
    pub target: Point3<f64>,
    pub up: Vector3<f64>,
    /// Vertical field of view in radians
    pub fov_y: f64,
    /// Viewport size in pixels (width, height)
    pub viewport: (f64, f64),
}

impl PerspectiveCamera {
    pub fn new(eye: Point3<f64>, target: Point3<f64>, fov_y: f64, viewport: (f64, f64)) -> Self {
        Self {
            eye,
            target,
            up: Vector3::y(),
            fov_y,
            viewport,
        }
    }

    /// Override the up vector (needed when looking straight down)
    pub fn with_up(mut self, up: Vector3<f64>) -> Self {
        self.up = up;
        self
    }

    /// Screen pixel to normalized device coordinates (-1..1, y up)
    #[inline]
    pub fn to_ndc(&self, screen: Point2<f64>) -> Point2<f64> {
        Point2::new(
            (screen.x / self.viewport.0) * 2.0 - 1.0,
            -(screen.y / self.viewport.1) * 2.0 + 1.0,
        )
    }

    /// View ray through a screen pixel
    pub fn ray(&self, screen: Point2<f64>) -> Ray {
        let ndc = self.to_ndc(screen);
        let forward = (self.target - self.eye).normalize();
        let right = forward.cross(&self.up).normalize();
        let camera_up = right.cross(&forward);

        let tan_half = (self.fov_y * 0.5).tan();
        let aspect = self.viewport.0 / self.viewport.1;

        let direction =
            forward + right * (ndc.x * tan_half * aspect) + camera_up * (ndc.y * tan_half);
        Ray::new(self.eye, direction)
    }
}

impl GroundProjector for PerspectiveCamera {
    fn project_to_plane(&self, screen: Point2<f64>, plane_height: f64) -> Option<Point3<f64>> {
        self.ray(screen).intersect_horizontal_plane(plane_height)
    }
}

/// Round to the nearest multiple of `step`
#[inline]
pub fn snap_to_grid(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}

/// Project a screen point onto the ground plane and snap X/Z to the grid
pub fn screen_to_world<P: GroundProjector + ?Sized>(
    projector: &P,
    screen: Point2<f64>,
    ground_height: f64,
    grid_step: f64,
) -> Option<Point3<f64>> {
    let hit = projector.project_to_plane(screen, ground_height)?;
    Some(Point3::new(
        snap_to_grid(hit.x, grid_step),
        ground_height,
        snap_to_grid(hit.z, grid_step),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn top_down() -> PerspectiveCamera {
        PerspectiveCamera::new(
            Point3::new(0.0, 20.0, 0.0),
            Point3::origin(),
            std::f64::consts::FRAC_PI_2,
            (800.0, 800.0),
        )
        .with_up(Vector3::new(0.0, 0.0, -1.0))
    }

    #[test]
    fn test_snap_to_grid() {
        assert_eq!(snap_to_grid(3.1, 2.0), 4.0);
        assert_eq!(snap_to_grid(2.9, 2.0), 2.0);
        assert_eq!(snap_to_grid(-0.9, 2.0), -0.0);
        assert_eq!(snap_to_grid(-3.2, 2.0), -4.0);
    }

    #[test]
    fn test_center_ray_hits_target() {
        let camera = top_down();
        let hit = camera
            .project_to_plane(Point2::new(400.0, 400.0), 0.0)
            .unwrap();
        assert_relative_eq!(hit.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(hit.z, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_corner_ray_spans_fov() {
        // 90 degree fov from 20 units up covers [-20, 20] on the ground
        let camera = top_down();
        let hit = camera.project_to_plane(Point2::new(800.0, 0.0), 0.0).unwrap();
        assert_relative_eq!(hit.x, 20.0, epsilon = 1e-9);
        assert_relative_eq!(hit.z, -20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_screen_to_world_is_deterministic() {
        let camera = top_down();
        let screen = Point2::new(123.0, 457.0);
        let a = screen_to_world(&camera, screen, 0.0, 2.0).unwrap();
        let b = screen_to_world(&camera, screen, 0.0, 2.0).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.x % 2.0, 0.0);
        assert_eq!(a.z % 2.0, 0.0);
    }

    #[test]
    fn test_parallel_ray_misses_plane() {
        let camera = PerspectiveCamera::new(
            Point3::new(0.0, 5.0, 0.0),
            Point3::new(10.0, 5.0, 0.0),
            1.0,
            (100.0, 100.0),
        );
        assert!(camera.project_to_plane(Point2::new(50.0, 50.0), 0.0).is_none());
    }

    #[test]
    fn test_ray_aabb() {
        let ray = Ray::new(Point3::new(-5.0, 1.0, 0.0), Vector3::x());
        let (t, normal) = ray
            .intersect_aabb(&Point3::new(-1.0, 0.0, -1.0), &Point3::new(1.0, 2.0, 1.0))
            .unwrap();
        assert_relative_eq!(t, 4.0);
        assert_eq!(normal, Vector3::new(-1.0, 0.0, 0.0));

        let miss = Ray::new(Point3::new(-5.0, 5.0, 0.0), Vector3::x());
        assert!(miss
            .intersect_aabb(&Point3::new(-1.0, 0.0, -1.0), &Point3::new(1.0, 2.0, 1.0))
            .is_none());
    }
}
