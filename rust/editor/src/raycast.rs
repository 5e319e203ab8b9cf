// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene picking.

use envbuilder_geometry::{local_offset, Point3, Ray, Vector3};

use crate::document::Document;
use crate::keys::NodeKey;
use crate::scene::SceneGraph;

/// A ray hit on a scene mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub node: NodeKey,
    pub point: Point3<f64>,
    /// World-space normal of the face that was hit
    pub normal: Vector3<f64>,
    pub distance: f64,
}

/// Finds the meshes a ray passes through.
pub trait Raycaster {
    /// Hits on attached walls, nearest first. Rays passing through an
    /// existing doorway do not hit that wall.
    fn cast_walls(&self, doc: &Document, ray: &Ray) -> Vec<RayHit>;

    /// Hits on every attached mesh, nearest first.
    fn cast_nodes(&self, doc: &Document, ray: &Ray) -> Vec<RayHit>;
}

/// Intersects rays with the world-space bounding boxes of meshes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundsRaycaster;

impl BoundsRaycaster {
    fn world_bounds(graph: &SceneGraph, node: NodeKey) -> Option<(Point3<f64>, Point3<f64>)> {
        let mesh = graph.get(node)?.as_mesh()?;
        if mesh.geometry.is_empty() {
            return None;
        }
        let world = graph.world_matrix(node).ok()?;
        let (lo, hi) = mesh.geometry.bounds();

        let mut min = Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut max = Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for i in 0..8 {
            let pick = |bit: usize, a: f32, b: f32| f64::from(if i & bit == 0 { a } else { b });
            let corner = Point3::new(pick(1, lo.x, hi.x), pick(2, lo.y, hi.y), pick(4, lo.z, hi.z));
            let p = world.transform_point(&corner);
            min = min.inf(&p);
            max = max.sup(&p);
        }
        Some((min, max))
    }

    fn hit(graph: &SceneGraph, node: NodeKey, ray: &Ray) -> Option<RayHit> {
        let (min, max) = Self::world_bounds(graph, node)?;
        let (distance, normal) = ray.intersect_aabb(&min, &max)?;
        Some(RayHit {
            node,
            point: ray.at(distance),
            normal,
            distance,
        })
    }

    /// The point lies inside one of the wall's doorway openings.
    fn in_doorway(doc: &Document, hit: &RayHit) -> bool {
        let Some(info) = doc.graph.get(hit.node).and_then(|n| n.wall()) else {
            return false;
        };
        let doorways = doc.doorways.doorways(info.id);
        if doorways.is_empty() {
            return false;
        }
        let Some(to_local) = doc
            .graph
            .world_matrix(hit.node)
            .ok()
            .and_then(|m| m.try_inverse())
        else {
            return false;
        };

        let local = to_local.transform_point(&hit.point);
        let x = local_offset(info.role, &Point3::origin(), &local);
        let above_floor = local.y + info.height / 2.0;
        doorways
            .iter()
            .any(|d| x > d.left() && x < d.right() && above_floor < d.height)
    }

    fn sorted(mut hits: Vec<RayHit>) -> Vec<RayHit> {
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

impl Raycaster for BoundsRaycaster {
    fn cast_walls(&self, doc: &Document, ray: &Ray) -> Vec<RayHit> {
        let hits = doc
            .graph
            .walls()
            .into_iter()
            .filter_map(|node| Self::hit(&doc.graph, node, ray))
            .filter(|hit| !Self::in_doorway(doc, hit))
            .collect();
        Self::sorted(hits)
    }

    fn cast_nodes(&self, doc: &Document, ray: &Ray) -> Vec<RayHit> {
        let hits = doc
            .graph
            .attached_nodes()
            .into_iter()
            .filter_map(|node| Self::hit(&doc.graph, node, ray))
            .collect();
        Self::sorted(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::WallId;
    use crate::material::MaterialSlot;
    use crate::scene::{MeshNode, Node, NodeKind, Transform, WallInfo};
    use approx::assert_relative_eq;
    use envbuilder_geometry::{create_rectangle, extrude, wall_solid, Doorway, WallRole};

    fn add_wall(doc: &mut Document, role: WallRole, center: Point3<f64>, id: u64) -> NodeKey {
        let solid = wall_solid(role, 4.0, 3.0, 0.1, &[]).unwrap();
        let key = doc.graph.insert(
            Node::new(
                role.name(),
                NodeKind::Mesh(MeshNode {
                    geometry: solid.mesh,
                    material: MaterialSlot::Single(Default::default()),
                    wall: Some(WallInfo {
                        id: WallId(id),
                        role,
                        length: 4.0,
                        height: 3.0,
                        thickness: 0.1,
                    }),
                }),
            )
            .with_transform(Transform::at(center)),
        );
        doc.graph.attach(key).unwrap();
        key
    }

    #[test]
    fn hits_sorted_by_distance() {
        let mut doc = Document::new();
        let far = add_wall(&mut doc, WallRole::Back, Point3::new(0.0, 1.5, 4.0), 0);
        let near = add_wall(&mut doc, WallRole::Front, Point3::new(0.0, 1.5, 0.0), 1);

        let ray = Ray::new(Point3::new(0.5, 1.0, -10.0), Vector3::z());
        let hits = BoundsRaycaster.cast_walls(&doc, &ray);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].node, near);
        assert_eq!(hits[1].node, far);
        assert_relative_eq!(hits[0].point.z, -0.05, epsilon = 1e-6);
        assert_relative_eq!(hits[0].normal, -Vector3::z());
    }

    #[test]
    fn detached_walls_are_ignored() {
        let mut doc = Document::new();
        let wall = add_wall(&mut doc, WallRole::Left, Point3::new(0.0, 1.5, 0.0), 0);
        doc.graph.detach(wall);

        let ray = Ray::new(Point3::new(-10.0, 1.0, 0.0), Vector3::x());
        assert!(BoundsRaycaster.cast_walls(&doc, &ray).is_empty());
    }

    #[test]
    fn rays_pass_through_doorways() {
        let mut doc = Document::new();
        let near = add_wall(&mut doc, WallRole::Front, Point3::new(0.0, 1.5, 0.0), 0);
        let far = add_wall(&mut doc, WallRole::Back, Point3::new(0.0, 1.5, 4.0), 1);
        doc.doorways.set_doorways(WallId(0), vec![Doorway::new(1.0, 1.0, 2.0)]);

        // Through the opening: only the far wall is hit
        let through = Ray::new(Point3::new(1.2, 1.0, -10.0), Vector3::z());
        let hits = BoundsRaycaster.cast_walls(&doc, &through);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].node, far);

        // Beside and above the opening the wall is solid
        for origin in [Point3::new(-1.0, 1.0, -10.0), Point3::new(1.2, 2.5, -10.0)] {
            let hits = BoundsRaycaster.cast_walls(&doc, &Ray::new(origin, Vector3::z()));
            assert_eq!(hits[0].node, near);
        }

        // Node picking ignores openings
        assert_eq!(BoundsRaycaster.cast_nodes(&doc, &through)[0].node, near);
    }

    #[test]
    fn nodes_include_non_wall_meshes() {
        let mut doc = Document::new();
        let solid = extrude(&create_rectangle(1.0, 1.0), 1.0).unwrap();
        let group = doc.graph.insert(Node::group("Box"));
        let mesh = doc.graph.insert(
            Node::mesh("Box", solid.mesh, MaterialSlot::Single(Default::default()))
                .with_transform(Transform::at(Point3::new(0.0, 0.0, 5.0))),
        );
        doc.graph.add_child(group, mesh).unwrap();
        doc.graph.attach(group).unwrap();

        let ray = Ray::new(Point3::new(0.0, 0.0, -10.0), Vector3::z());
        assert!(BoundsRaycaster.cast_walls(&doc, &ray).is_empty());

        let hits = BoundsRaycaster.cast_nodes(&doc, &ray);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].node, mesh);
    }
}
